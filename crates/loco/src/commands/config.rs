//! Config command implementation

use anyhow::{Context, Result};
use loco_core::{resolve_default_config, ExplicitDefaults};
use loco_logs::{register, FileStateStore};

use crate::cli::ConfigArgs;
use crate::output::print_registered;

pub fn execute(args: ConfigArgs) -> Result<()> {
    let path = super::absolute_path(&args.file)?;

    let config = resolve_default_config(ExplicitDefaults::new(args.interval, args.suffix))
        .context("Cannot resolve rotation settings")?;

    let state = register(&FileStateStore::in_home(), &path, config)
        .with_context(|| format!("Cannot store configuration for {}", path.display()))?;

    print_registered(&state);
    Ok(())
}
