//! Tool configuration loaded from ~/.farmshare/config.ini.
//!
//! Settings structs live in [`settings`], production defaults in
//! [`defaults`], INI parsing in [`parser`], and serialization in
//! [`writer`]; [`file`] ties them together around the on-disk file.

pub mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ApplySettings, ConfigFile, PathSettings, SchedulerSettings};
