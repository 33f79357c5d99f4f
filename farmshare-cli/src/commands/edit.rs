//! `edit` command: the interactive allocation wizard.
//!
//! This module is presentation only. Screen order and transition rules live
//! in [`farmshare::wizard::WizardFlow`]; validation in
//! [`farmshare::limits::propose_change`]; the write-back protocol in
//! [`farmshare::apply`]. The wizard prompts, reports what happened to the
//! flow, and renders apply progress.

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use indexmap::IndexMap;

use farmshare::apply::{
    start_apply, ApplyCoordinator, ApplyProgress, ApplyRequest,
};
use farmshare::config::ConfigFile;
use farmshare::limits::{
    display_name, is_linux, load_current, propose_change, section_names, sibling_group,
    AllocationDocument, ChangeSet, ValidationError,
};
use farmshare::scheduler::{CommandReload, HttpStatusClient, ReloadOutcome};
use farmshare::wizard::{StagedEdit, WizardError, WizardEvent, WizardFlow, WizardState};

use crate::error::CliError;
use crate::runner::CliRunner;

pub fn run() -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("edit");
    let config = runner.config().clone();
    let theme = ColorfulTheme::default();

    let store = config.store();
    let baseline = store.load()?;
    if store.has_staged() {
        println!(
            "{}",
            style("Resuming previously staged changes.").yellow()
        );
        println!();
    }

    let mut flow = WizardFlow::new(baseline);

    loop {
        match flow.state().clone() {
            WizardState::SectionSelect => {
                let event = match select_section(&theme, flow.document())? {
                    Some(section) => WizardEvent::SectionChosen(section),
                    None => WizardEvent::Cancelled,
                };
                advance(&mut flow, event)?;
            }
            WizardState::Editing { section } => {
                let event = match prompt_values(&theme, &config, flow.document(), &section)? {
                    Some(change_set) => WizardEvent::ChangesProposed(change_set),
                    None => WizardEvent::Cancelled,
                };
                advance(&mut flow, event)?;
            }
            WizardState::Confirming { section, change_set } => {
                let event = match confirm_changes(&theme, &section, &change_set)? {
                    Some(apply_to_all) => {
                        let mut merged = flow.document().clone();
                        let siblings = sibling_group(&merged, &section);
                        build_coordinator(&config)?
                            .merge_changes(
                                &mut merged,
                                &section,
                                &change_set,
                                &siblings,
                                apply_to_all,
                            )
                            .map_err(farmshare::apply::ApplyError::from)?;
                        let path = store.stage(&merged)?;
                        println!("Changes staged at {}", style(path.display()).cyan());
                        println!();
                        WizardEvent::StageConfirmed {
                            document: merged,
                            apply_to_all,
                        }
                    }
                    None => WizardEvent::Cancelled,
                };
                advance(&mut flow, event)?;
            }
            WizardState::Staged => {
                let choices = [
                    "Write to the farm now",
                    "Make more changes first",
                    "Discard staged changes",
                ];
                let selection = Select::with_theme(&theme)
                    .with_prompt("Staged changes are ready")
                    .items(&choices)
                    .default(0)
                    .interact()?;
                let event = match selection {
                    0 => WizardEvent::WriteRequested,
                    1 => WizardEvent::MoreChanges,
                    _ => {
                        store.discard_staged()?;
                        let document = store.load()?;
                        println!("Staged changes discarded.");
                        println!();
                        WizardEvent::Discarded { document }
                    }
                };
                advance(&mut flow, event)?;
            }
            WizardState::Applying => {
                let pending: Vec<StagedEdit> = flow.pending().to_vec();
                run_apply(&config, flow.document().clone(), &pending)?;
                advance(&mut flow, WizardEvent::ApplyFinished)?;
            }
            WizardState::Complete => break,
        }
    }

    if store.has_staged() {
        println!();
        println!(
            "Staged changes kept at {}; run 'farmshare' again to write or discard them.",
            store.staged_path().display()
        );
    }

    Ok(())
}

fn advance(flow: &mut WizardFlow, event: WizardEvent) -> Result<(), CliError> {
    flow.handle(event)
        .map(|_| ())
        .map_err(|e: WizardError| CliError::Config(e.to_string()))
}

fn build_coordinator(
    config: &ConfigFile,
) -> Result<ApplyCoordinator<HttpStatusClient, CommandReload>, CliError> {
    let status = HttpStatusClient::new(&config.scheduler.status_url, config.http_timeout())?;
    let reload = CommandReload::new(&config.scheduler.reload_command);
    Ok(ApplyCoordinator::new(
        config.store(),
        status,
        reload,
        config.apply_config(),
    ))
}

/// Section selection screen. `None` means quit.
fn select_section(
    theme: &ColorfulTheme,
    document: &AllocationDocument,
) -> Result<Option<String>, CliError> {
    let sections = section_names(document);
    if sections.is_empty() {
        println!("No farm sections found in the allocation document.");
        return Ok(None);
    }

    let items: Vec<String> = sections
        .iter()
        .map(|s| display_name(s))
        .chain(std::iter::once("Quit".to_string()))
        .collect();

    let selection = Select::with_theme(theme)
        .with_prompt("Choose a farm section")
        .items(&items)
        .default(0)
        .interact()?;

    if selection < sections.len() {
        Ok(Some(sections[selection].clone()))
    } else {
        Ok(None)
    }
}

/// Value entry screen. Re-prompts on a bad nominal sum; `None` means the
/// operator backed out.
fn prompt_values(
    theme: &ColorfulTheme,
    config: &ConfigFile,
    document: &AllocationDocument,
    section: &str,
) -> Result<Option<ChangeSet>, CliError> {
    let current = load_current(document, section, &config.apply.excluded_shows);
    if current.is_empty() {
        println!("No editable shows in this section.");
        return Ok(None);
    }

    println!();
    println!("{}", style(display_name(section)).bold().underlined());
    println!("Enter percentages with one decimal. Nominals must sum to 100.");
    println!();

    loop {
        let mut nominals: IndexMap<String, f64> = IndexMap::new();
        let mut caps: IndexMap<String, f64> = IndexMap::new();

        for (show, (nominal, cap)) in &current {
            let new_nominal: f64 = Input::with_theme(theme)
                .with_prompt(format!("{} nominal %", show))
                .default(*nominal)
                .validate_with(|value: &f64| {
                    if (0.0..=100.0).contains(value) {
                        Ok(())
                    } else {
                        Err("must be between 0 and 100")
                    }
                })
                .interact_text()?;
            let new_cap: f64 = Input::with_theme(theme)
                .with_prompt(format!("{} cap %", show))
                .default(*cap)
                .validate_with(|value: &f64| {
                    if (0.0..=100.0).contains(value) {
                        Ok(())
                    } else {
                        Err("must be between 0 and 100")
                    }
                })
                .interact_text()?;
            nominals.insert(show.clone(), new_nominal);
            caps.insert(show.clone(), new_cap);
        }

        match propose_change(&current, &nominals, &caps) {
            Ok(change_set) => return Ok(Some(change_set)),
            Err(e @ ValidationError::NominalSumMismatch { .. }) => {
                println!();
                println!("{}", style(e).red());
                println!();
                let retry = Confirm::with_theme(theme)
                    .with_prompt("Re-enter values?")
                    .default(true)
                    .interact()?;
                if !retry {
                    return Ok(None);
                }
            }
            Err(e) => return Err(CliError::Config(e.to_string())),
        }
    }
}

/// Diff review screen. `Some(apply_to_all)` stages, `None` cancels.
fn confirm_changes(
    theme: &ColorfulTheme,
    section: &str,
    change_set: &ChangeSet,
) -> Result<Option<bool>, CliError> {
    println!();
    println!("{}", style("Proposed changes").bold());
    println!(
        "{:<20} {:>17} {:>17}",
        "Show", "Nominal", "Cap"
    );
    for change in change_set.changes() {
        let line = format!(
            "{:<20} {:>6.1}% -> {:>6.1}% {:>6.1}% -> {:>6.1}%",
            change.show,
            change.nominal_before,
            change.nominal_after,
            change.cap_before,
            change.cap_after,
        );
        if change.is_noop() {
            println!("{}", style(line).dim());
        } else {
            println!("{}", line);
        }
    }
    println!();

    let mut choices = vec!["Stage these changes".to_string()];
    let mass_apply_index = if is_linux(section) {
        choices.push("Stage for every Linux section".to_string());
        Some(1)
    } else {
        None
    };
    choices.push("Cancel".to_string());

    let selection = Select::with_theme(theme)
        .with_prompt("Confirm")
        .items(&choices)
        .default(0)
        .interact()?;

    if selection == 0 {
        Ok(Some(false))
    } else if Some(selection) == mass_apply_index {
        Ok(Some(true))
    } else {
        Ok(None)
    }
}

/// Run the write-back protocol for every staged edit, rendering progress.
fn run_apply(
    config: &ConfigFile,
    document: AllocationDocument,
    pending: &[StagedEdit],
) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Config(format!("Failed to start async runtime: {}", e)))?;

    println!();
    println!(
        "{}",
        style("Writing changes and awaiting scheduler confirmation.").bold()
    );
    println!("Press Ctrl-C to stop waiting; the written file stays in place.");
    println!();

    for edit in pending {
        let coordinator = build_coordinator(config)?;
        let siblings = sibling_group(&document, &edit.section);
        let request = ApplyRequest {
            document: document.clone(),
            section: edit.section.clone(),
            change_set: edit.change_set.clone(),
            siblings,
            apply_to_all: edit.apply_to_all,
        };
        runtime.block_on(drive_apply(coordinator, request))?;
    }

    println!();
    println!("{}", style("All changes confirmed live.").green().bold());
    Ok(())
}

async fn drive_apply(
    coordinator: ApplyCoordinator<HttpStatusClient, CommandReload>,
    request: ApplyRequest,
) -> Result<(), CliError> {
    let mut handle = start_apply(coordinator, request);

    let cancel = handle.cancellation();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            println!("Cancelling; the written file stays in place.");
            cancel.cancel();
        }
    });

    while let Some(event) = handle.recv_progress().await {
        render_progress(&event);
    }
    watcher.abort();

    handle.wait().await?;
    Ok(())
}

fn render_progress(event: &ApplyProgress) {
    match event {
        ApplyProgress::Committed => {
            println!("{} Live config written (backup taken)", style("✓").green());
        }
        ApplyProgress::ReloadIssued { attempt, outcome } => {
            let note = match outcome {
                ReloadOutcome::Succeeded => "ok",
                ReloadOutcome::SucceededViaFallback => "ok via shell",
                ReloadOutcome::Failed => "failed, relying on scheduler cadence",
            };
            println!("  Reload signal #{}: {}", attempt, note);
        }
        ApplyProgress::Observation {
            show,
            observation,
            target,
            reported,
        } => {
            let seen = match reported {
                Some(value) => format!("{:.1}%", value),
                None => "unavailable".to_string(),
            };
            println!(
                "  {}: observation {}: reported {} (target {:.1}%)",
                show, observation, seen, target
            );
        }
        ApplyProgress::ShowConverged { show, observations } => {
            println!(
                "{} {} confirmed after {} observation(s)",
                style("✓").green(),
                show,
                observations
            );
        }
        ApplyProgress::Complete => {}
    }
}
