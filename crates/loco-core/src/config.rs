//! Default rotation settings
//!
//! Values are looked up in an ordered chain of sources, first present value
//! wins (per field):
//! - explicit values (command line flags)
//! - environment (`LOCO_INTERVAL`, `LOCO_SUFFIX`)
//! - the user defaults file (`~/.loco/defaults.json`)
//! - built-in constants (`1d`, `%c`)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::interval::Interval;
use crate::types::Config;

/// A place default rotation settings can be read from.
///
/// `Ok(None)` means the source has no opinion and the next one is asked.
pub trait DefaultsSource {
    /// Short name used in diagnostics
    fn name(&self) -> &str;

    fn interval(&self) -> Result<Option<Interval>>;

    fn suffix(&self) -> Result<Option<String>>;
}

/// Values given explicitly by the caller
#[derive(Debug, Clone, Default)]
pub struct ExplicitDefaults {
    pub interval: Option<Interval>,
    pub suffix: Option<String>,
}

impl ExplicitDefaults {
    pub fn new(interval: Option<Interval>, suffix: Option<String>) -> Self {
        Self { interval, suffix }
    }
}

impl DefaultsSource for ExplicitDefaults {
    fn name(&self) -> &str {
        "command line"
    }

    fn interval(&self) -> Result<Option<Interval>> {
        Ok(self.interval)
    }

    fn suffix(&self) -> Result<Option<String>> {
        Ok(non_empty(self.suffix.clone()))
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Environment variables `LOCO_INTERVAL` and `LOCO_SUFFIX`
pub struct EnvDefaults {
    lookup: EnvLookup,
}

impl EnvDefaults {
    /// Read from the process environment
    pub fn new() -> Self {
        Self {
            lookup: Box::new(|key| std::env::var(key).ok()),
        }
    }

    /// Read from a fixed set of variables instead of the process environment
    pub fn from_map(vars: HashMap<String, String>) -> Self {
        Self {
            lookup: Box::new(move |key| vars.get(key).cloned()),
        }
    }
}

impl Default for EnvDefaults {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultsSource for EnvDefaults {
    fn name(&self) -> &str {
        "environment"
    }

    fn interval(&self) -> Result<Option<Interval>> {
        non_empty((self.lookup)(ENV_INTERVAL))
            .map(|expr| Interval::parse(&expr))
            .transpose()
    }

    fn suffix(&self) -> Result<Option<String>> {
        Ok(non_empty((self.lookup)(ENV_SUFFIX)))
    }
}

/// Contents of the user defaults file.
///
/// Fields are kept as written and validated on use, so a bad interval does
/// not hide a good suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

/// The persisted user defaults (`~/.loco/defaults.json`)
#[derive(Debug, Clone)]
pub struct DefaultsFile {
    path: PathBuf,
}

impl DefaultsFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// The defaults file in the loco home directory
    pub fn in_home() -> Self {
        Self::new(defaults_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file; a missing file yields empty defaults
    pub fn load(&self) -> Result<Defaults> {
        if !self.path.exists() {
            debug!("Defaults file not found at {:?}", self.path);
            return Ok(Defaults::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::io(format!("Cannot read {}", self.path.display()), e))?;
        let defaults = serde_json::from_str(&content).map_err(|e| Error::Decode {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(defaults)
    }

    pub fn save(&self, defaults: &Defaults) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::io(format!("Cannot create {}", parent.display()), e))?;
        }

        let content = serde_json::to_string_pretty(defaults)?;
        std::fs::write(&self.path, content)
            .map_err(|e| Error::io(format!("Cannot write {}", self.path.display()), e))?;

        info!("Saved defaults to {:?}", self.path);
        Ok(())
    }

    /// Persist a new default interval, keeping the stored suffix
    pub fn set_interval(&self, interval: Interval) -> Result<()> {
        let mut defaults = self.load()?;
        defaults.interval = Some(interval.to_string());
        self.save(&defaults)
    }

    /// Persist a new default suffix, keeping the stored interval
    pub fn set_suffix<S: Into<String>>(&self, suffix: S) -> Result<()> {
        let mut defaults = self.load()?;
        defaults.suffix = non_empty(Some(suffix.into()));
        self.save(&defaults)
    }
}

impl DefaultsSource for DefaultsFile {
    fn name(&self) -> &str {
        "defaults file"
    }

    fn interval(&self) -> Result<Option<Interval>> {
        non_empty(self.load()?.interval)
            .map(|expr| Interval::parse(&expr))
            .transpose()
    }

    fn suffix(&self) -> Result<Option<String>> {
        Ok(non_empty(self.load()?.suffix))
    }
}

/// Compiled-in fallbacks
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltInDefaults;

impl DefaultsSource for BuiltInDefaults {
    fn name(&self) -> &str {
        "built-in"
    }

    fn interval(&self) -> Result<Option<Interval>> {
        Interval::parse(DEFAULT_INTERVAL).map(Some)
    }

    fn suffix(&self) -> Result<Option<String>> {
        Ok(Some(DEFAULT_SUFFIX.to_string()))
    }
}

/// Ordered list of sources, first present value wins
#[derive(Default)]
pub struct DefaultsChain {
    sources: Vec<Box<dyn DefaultsSource>>,
}

impl DefaultsChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source<S: DefaultsSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Defaults as stored on disk: defaults file, then built-in values
    pub fn stored() -> Self {
        Self::new()
            .with_source(DefaultsFile::in_home())
            .with_source(BuiltInDefaults)
    }

    /// Full chain used when registering a file: explicit values,
    /// environment, defaults file, built-in values
    pub fn runtime(explicit: ExplicitDefaults) -> Self {
        Self::new()
            .with_source(explicit)
            .with_source(EnvDefaults::new())
            .with_source(DefaultsFile::in_home())
            .with_source(BuiltInDefaults)
    }

    pub fn interval(&self) -> Result<Interval> {
        self.first(|source| source.interval())
            .ok_or_else(|| Error::config("Cannot find a default interval"))
    }

    pub fn suffix(&self) -> Result<String> {
        self.first(|source| source.suffix())
            .ok_or_else(|| Error::config("Cannot find a default suffix"))
    }

    pub fn resolve(&self) -> Result<Config> {
        Ok(Config::new(self.interval()?, self.suffix()?))
    }

    fn first<T>(&self, get: impl Fn(&dyn DefaultsSource) -> Result<Option<T>>) -> Option<T> {
        for source in &self.sources {
            match get(source.as_ref()) {
                Ok(Some(value)) => {
                    debug!("Using default from {}", source.name());
                    return Some(value);
                }
                Ok(None) => {}
                Err(e) => warn!("Ignoring defaults from {}: {}", source.name(), e),
            }
        }
        None
    }
}

/// Resolve a config from explicit values, falling back to the runtime chain
pub fn resolve_default_config(explicit: ExplicitDefaults) -> Result<Config> {
    DefaultsChain::runtime(explicit).resolve()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
