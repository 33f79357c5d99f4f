//! `show` command: print current allocations for one section.

use farmshare::limits::{display_name, load_current};

use crate::error::CliError;
use crate::runner::CliRunner;

pub fn run(section: &str) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("show");

    let store = runner.config().store();
    let document = store.load()?;

    if !document.has_section(section) {
        return Err(CliError::Config(format!(
            "Unknown section '{}'. Use 'farmshare sections' to list them.",
            section
        )));
    }

    let current = load_current(&document, section, &runner.config().apply.excluded_shows);

    println!("{}", display_name(section));
    if store.has_staged() {
        println!("(reading staged changes)");
    }
    println!();

    if current.is_empty() {
        println!("No editable shows in this section.");
        return Ok(());
    }

    println!("{:<20} {:>9} {:>9}", "Show", "Nominal", "Cap");
    for (show, (nominal, cap)) in &current {
        println!("{:<20} {:>8.1}% {:>8.1}%", show, nominal, cap);
    }

    Ok(())
}
