//! Remove command implementation

use anyhow::{bail, Context, Result};
use loco_logs::remove_state;
use std::path::Path;

use crate::output::print_success;

pub fn execute(file: &Path) -> Result<()> {
    let path = super::absolute_path(file)?;

    match remove_state(&path) {
        Ok(()) => {
            print_success(&format!("Removed {}", path.display()));
            Ok(())
        }
        Err(e) if e.is_not_found() => bail!("{} is not a registered log file", path.display()),
        Err(e) => Err(e).with_context(|| format!("Cannot remove {}", path.display())),
    }
}
