//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`edit`] - Interactive allocation editing wizard (the default)
//! - [`show`] - Print current allocations for a section
//! - [`sections`] - List farm sections
//! - [`discard`] - Delete the staged scratch file
//! - [`config`] - Configuration management (list, path)

pub mod config;
pub mod discard;
pub mod edit;
pub mod sections;
pub mod show;
