//! `discard` command: delete the staged scratch file.

use crate::error::CliError;
use crate::runner::CliRunner;

pub fn run() -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("discard");

    let store = runner.config().store();
    if store.has_staged() {
        store.discard_staged()?;
        println!("Staged changes discarded.");
    } else {
        println!("Nothing staged.");
    }

    Ok(())
}
