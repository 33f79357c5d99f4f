//! Allocation document domain: model, persistence, editing, and sections.
//!
//! - [`document`] - typed model of the JSON allocation document
//! - [`store`] - live/staged/backup persistence ([`ConfigStore`])
//! - [`editor`] - validated editing and the nominal-sum invariant
//! - [`changeset`] - before/after diff consumed by confirmation and apply
//! - [`sections`] - farm section discovery, ordering, sibling groups

pub mod changeset;
pub mod document;
pub mod editor;
pub mod sections;
pub mod store;

pub use changeset::{ChangeSet, ShowChange};
pub use document::{
    fraction_to_percent, percent_to_fraction, round_percent, AllocationDocument, DocumentError,
    SectionRecord, ShowShares,
};
pub use editor::{load_current, propose_change, CurrentValues, ValidationError};
pub use sections::{display_name, is_linux, section_names, sibling_group};
pub use store::{ConfigStore, StoreError, STAGED_FILE_NAME};
