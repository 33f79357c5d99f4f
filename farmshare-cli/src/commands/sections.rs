//! `sections` command: list the farm sections in the allocation document.

use farmshare::limits::{display_name, section_names};

use crate::error::CliError;
use crate::runner::CliRunner;

pub fn run() -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("sections");

    let store = runner.config().store();
    let document = store.load()?;
    if store.has_staged() {
        println!("(reading staged changes)");
        println!();
    }

    let sections = section_names(&document);
    if sections.is_empty() {
        println!("No farm sections found in the allocation document.");
        return Ok(());
    }

    for section in &sections {
        println!("{:<24} {}", section, display_name(section));
    }

    Ok(())
}
