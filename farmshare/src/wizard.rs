//! Wizard flow for the interactive editing session.
//!
//! The flow is a typed state machine: the front-end performs all I/O and
//! prompting, then reports what happened as a [`WizardEvent`]; the flow
//! validates the transition and tracks the working document and any staged
//! edits. Cancelling any screen returns to section selection, and staging
//! makes the staged document the new baseline so further edits build on it.

use thiserror::Error;

use crate::limits::{AllocationDocument, ChangeSet};

/// One staged edit awaiting write-back.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedEdit {
    pub section: String,
    pub change_set: ChangeSet,
    pub apply_to_all: bool,
}

/// Screens of the wizard.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardState {
    /// Choosing which farm section to edit.
    SectionSelect,
    /// Entering new nominal/cap values for the chosen section.
    Editing { section: String },
    /// Reviewing the before/after diff before staging.
    Confirming { section: String, change_set: ChangeSet },
    /// Edits staged; deciding between write, more changes, or discard.
    Staged,
    /// Apply protocol running against the scheduler.
    Applying,
    /// Session finished.
    Complete,
}

impl WizardState {
    fn name(&self) -> &'static str {
        match self {
            WizardState::SectionSelect => "section select",
            WizardState::Editing { .. } => "editing",
            WizardState::Confirming { .. } => "confirming",
            WizardState::Staged => "staged",
            WizardState::Applying => "applying",
            WizardState::Complete => "complete",
        }
    }
}

/// What the front-end did on the current screen.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    /// A section was chosen on the selection screen.
    SectionChosen(String),
    /// Validated values were entered, producing a change set.
    ChangesProposed(ChangeSet),
    /// The diff was accepted and the merged document written to scratch;
    /// `document` is the merged result and becomes the new baseline.
    StageConfirmed {
        document: AllocationDocument,
        apply_to_all: bool,
    },
    /// Write-back requested for everything staged.
    WriteRequested,
    /// Another round of edits requested on top of the staged baseline.
    MoreChanges,
    /// Scratch file discarded; `document` is the reloaded live baseline.
    Discarded { document: AllocationDocument },
    /// Current screen abandoned.
    Cancelled,
    /// The apply protocol finished (or was cancelled mid-poll).
    ApplyFinished,
}

impl WizardEvent {
    fn name(&self) -> &'static str {
        match self {
            WizardEvent::SectionChosen(_) => "section chosen",
            WizardEvent::ChangesProposed(_) => "changes proposed",
            WizardEvent::StageConfirmed { .. } => "stage confirmed",
            WizardEvent::WriteRequested => "write requested",
            WizardEvent::MoreChanges => "more changes",
            WizardEvent::Discarded { .. } => "discarded",
            WizardEvent::Cancelled => "cancelled",
            WizardEvent::ApplyFinished => "apply finished",
        }
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("event '{event}' is not valid on the {state} screen")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
    #[error("section '{0}' is not present in the allocation document")]
    UnknownSection(String),
}

/// State machine for one editing session.
#[derive(Debug, Clone)]
pub struct WizardFlow {
    document: AllocationDocument,
    state: WizardState,
    pending: Vec<StagedEdit>,
}

impl WizardFlow {
    /// Start a session from the loaded baseline (staged file if present,
    /// live file otherwise).
    pub fn new(document: AllocationDocument) -> Self {
        Self {
            document,
            state: WizardState::SectionSelect,
            pending: Vec::new(),
        }
    }

    /// Current screen.
    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Working document the next edit starts from.
    pub fn document(&self) -> &AllocationDocument {
        &self.document
    }

    /// Edits staged so far, in the order they were made.
    pub fn pending(&self) -> &[StagedEdit] {
        &self.pending
    }

    /// Apply one event, moving to the next screen.
    pub fn handle(&mut self, event: WizardEvent) -> Result<&WizardState, WizardError> {
        let next = match (&self.state, event) {
            (WizardState::SectionSelect, WizardEvent::SectionChosen(section)) => {
                if !self.document.has_section(&section) {
                    return Err(WizardError::UnknownSection(section));
                }
                WizardState::Editing { section }
            }
            (WizardState::Editing { section }, WizardEvent::ChangesProposed(change_set)) => {
                WizardState::Confirming {
                    section: section.clone(),
                    change_set,
                }
            }
            (
                WizardState::Confirming { section, change_set },
                WizardEvent::StageConfirmed {
                    document,
                    apply_to_all,
                },
            ) => {
                self.pending.push(StagedEdit {
                    section: section.clone(),
                    change_set: change_set.clone(),
                    apply_to_all,
                });
                self.document = document;
                WizardState::Staged
            }
            (WizardState::Staged, WizardEvent::WriteRequested) => WizardState::Applying,
            (WizardState::Staged, WizardEvent::MoreChanges) => WizardState::SectionSelect,
            (WizardState::Staged, WizardEvent::Discarded { document }) => {
                self.pending.clear();
                self.document = document;
                WizardState::SectionSelect
            }
            (WizardState::Applying, WizardEvent::ApplyFinished) => {
                self.pending.clear();
                WizardState::Complete
            }
            // Cancel abandons the current screen but keeps staged work.
            (WizardState::SectionSelect, WizardEvent::Cancelled) => WizardState::Complete,
            (_, WizardEvent::Cancelled) => WizardState::SectionSelect,
            (state, event) => {
                return Err(WizardError::InvalidTransition {
                    state: state.name(),
                    event: event.name(),
                })
            }
        };
        self.state = next;
        Ok(&self.state)
    }
}
