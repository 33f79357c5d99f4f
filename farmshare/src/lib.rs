//! FarmShare - render farm allocation editing
//!
//! This library edits the shared resource-allocation configuration of a
//! render farm: per-show nominal and cap quotas across farm sections.
//! Changes are staged to a scratch file, committed to the live file behind
//! a timestamped backup, and then pushed to the external job scheduler by
//! issuing its reload command and polling its status endpoint until the
//! new values are observed live.
//!
//! # High-Level API
//!
//! ```ignore
//! use farmshare::config::ConfigFile;
//! use farmshare::apply::{start_apply, ApplyConfig, ApplyCoordinator, ApplyRequest};
//! use farmshare::scheduler::{CommandReload, HttpStatusClient};
//!
//! let settings = ConfigFile::load()?;
//! let coordinator = ApplyCoordinator::new(
//!     settings.store(),
//!     HttpStatusClient::new(&settings.scheduler.status_url, settings.http_timeout())?,
//!     CommandReload::new(&settings.scheduler.reload_command),
//!     settings.apply_config(),
//! );
//! let handle = start_apply(coordinator, request);
//! ```

pub mod apply;
pub mod config;
pub mod limits;
pub mod logging;
pub mod scheduler;
pub mod wizard;

/// Version of the FarmShare library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
