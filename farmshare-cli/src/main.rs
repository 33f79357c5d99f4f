//! FarmShare CLI - Command-line interface
//!
//! This binary provides the terminal interface to the FarmShare library:
//! an interactive wizard for editing render-farm show allocations, plus
//! inspection commands.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "farmshare")]
#[command(version = farmshare::VERSION)]
#[command(about = "Edit render-farm show allocations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive allocation editing wizard (default)
    Edit,

    /// Print current allocations for a farm section
    Show {
        /// Section name, e.g. linuxfarm or linuxfarm_2
        section: String,
    },

    /// List farm sections
    Sections,

    /// Delete the staged scratch file without writing it
    Discard,

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: commands::config::ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Edit) {
        Commands::Edit => commands::edit::run(),
        Commands::Show { section } => commands::show::run(&section),
        Commands::Sections => commands::sections::run(),
        Commands::Discard => commands::discard::run(),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
