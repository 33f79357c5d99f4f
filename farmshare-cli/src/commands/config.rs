//! Configuration management CLI commands.
//!
//! Provides `config list` and `config path` for inspecting the tool
//! settings from the command line, and `config init` to write a default
//! config.ini for editing.

use clap::Subcommand;
use farmshare::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,

    /// Create a default config file if none exists
    Init,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Init => run_init(),
    }
}

/// List all configuration settings.
fn run_list() -> Result<(), CliError> {
    let config = ConfigFile::load().unwrap_or_default();

    println!("Configuration Settings");
    println!("======================");
    println!();
    println!("[paths]");
    println!("  live_config = {}", config.paths.live_config.display());
    println!("  temp_dir = {}", config.paths.temp_dir.display());
    println!("  backup_dir = {}", config.paths.backup_dir.display());
    println!();
    println!("[scheduler]");
    println!("  reload_command = {}", config.scheduler.reload_command);
    println!("  status_url = {}", config.scheduler.status_url);
    println!(
        "  http_timeout_secs = {}",
        config.scheduler.http_timeout_secs
    );
    println!();
    println!("[apply]");
    println!("  poll_interval_secs = {}", config.apply.poll_interval_secs);
    println!("  reload_settle_secs = {}", config.apply.reload_settle_secs);
    println!("  commit_settle_secs = {}", config.apply.commit_settle_secs);
    println!("  max_observations = {}", config.apply.max_observations);
    println!(
        "  excluded_shows = {}",
        config.apply.excluded_shows.join(",")
    );
    println!(
        "  mass_apply_exclude = {}",
        config.apply.mass_apply_exclude.join(",")
    );

    Ok(())
}

/// Show the configuration file path.
fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

/// Create a default config file if none exists.
fn run_init() -> Result<(), CliError> {
    let path = config_file_path();
    if path.exists() {
        println!("Configuration file already exists at {}", path.display());
        return Ok(());
    }
    let path = ConfigFile::ensure_exists()?;
    println!("Created default configuration at {}", path.display());
    Ok(())
}
