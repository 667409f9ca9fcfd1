//! Collect command implementation

use anyhow::{Context, Result};
use loco_core::{resolve_default_config, ExplicitDefaults};
use loco_logs::{load_writer, new_writer};
use std::io::{self, Write};
use tracing::{debug, info};

use crate::cli::CollectArgs;

/// Writes everything to both `primary` and `secondary`
struct Tee<A, B> {
    primary: A,
    secondary: B,
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.primary.write_all(buf)?;
        self.secondary.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        self.secondary.flush()
    }
}

pub fn execute(args: CollectArgs) -> Result<()> {
    let path = super::absolute_path(&args.file)?;
    let mut writer = match load_writer(&path) {
        Ok(writer) => writer,
        Err(e) if e.is_not_found() => {
            let config = resolve_default_config(ExplicitDefaults::default())
                .context("Cannot resolve rotation settings")?;
            info!(
                "Registering {} (interval {}, suffix {})",
                path.display(),
                config.interval,
                config.suffix
            );
            new_writer(&path, config)
                .with_context(|| format!("Cannot register {}", path.display()))?
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Cannot load state for {}", path.display()));
        }
    };

    let mut input = io::stdin().lock();
    let copied = if args.tee {
        let mut tee = Tee {
            primary: &mut writer,
            secondary: io::stdout().lock(),
        };
        io::copy(&mut input, &mut tee)
    } else {
        io::copy(&mut input, &mut writer)
    }
    .with_context(|| format!("Cannot collect into {}", path.display()))?;

    writer
        .close()
        .with_context(|| format!("Cannot close {}", path.display()))?;

    debug!("Collected {} bytes into {}", copied, path.display());
    Ok(())
}
