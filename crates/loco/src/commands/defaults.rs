//! Defaults command implementation

use anyhow::{Context, Result};
use loco_core::{DefaultsChain, DefaultsFile};

use crate::cli::DefaultsArgs;
use crate::output::{print_defaults, print_success};

pub fn execute(args: DefaultsArgs) -> Result<()> {
    if args.interval.is_none() && args.suffix.is_none() {
        let config = DefaultsChain::stored()
            .resolve()
            .context("Cannot resolve default settings")?;
        print_defaults(&config);
        return Ok(());
    }

    let file = DefaultsFile::in_home();

    if let Some(interval) = args.interval {
        file.set_interval(interval)
            .context("Cannot set default interval")?;
        print_success(&format!("Default interval set to {}", interval));
    }

    if let Some(suffix) = args.suffix {
        file.set_suffix(suffix.as_str())
            .context("Cannot set default suffix")?;
        print_success(&format!("Default suffix set to {}", suffix));
    }

    Ok(())
}
