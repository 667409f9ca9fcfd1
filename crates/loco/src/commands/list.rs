//! List command implementation

use anyhow::{Context, Result};
use loco_logs::list_states;
use tracing::debug;

use crate::output::{print_states, print_warning};

pub fn execute() -> Result<()> {
    let listing = list_states().context("Cannot list registered log files")?;

    print_states(&listing.states);

    if !listing.skipped.is_empty() {
        for path in &listing.skipped {
            debug!("Unreadable state record: {}", path.display());
        }
        print_warning(&format!(
            "Skipped {} unreadable state record(s)",
            listing.skipped.len()
        ));
    }

    Ok(())
}
