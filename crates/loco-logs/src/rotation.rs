//! Rotated file naming
//!
//! A rotated file keeps the live file's directory, base name and extension,
//! with the expanded suffix pattern inserted before the extension:
//! `/var/log/app.log` with suffix `%c` and counter 3 becomes
//! `/var/log/app.3.log`.
//!
//! Pattern tokens:
//! - `%c` rotation counter
//! - `%Y` `%m` `%d` year, month, day of the last rotation (UTC)
//! - `%H` `%M` `%S` hour, minute, second of the last rotation (UTC)
//! - `%%` a literal `%`
//!
//! Unknown `%x` sequences are copied unchanged.

use chrono::{DateTime, Datelike, Timelike, Utc};
use loco_core::State;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Computes where the live file goes when it is rotated
pub trait FileNameGenerator: Send + Sync {
    fn file_name(&self, state: &State) -> PathBuf;
}

type Renderer = Box<dyn Fn(&State) -> String + Send + Sync>;

/// Token letter to renderer mapping used to expand suffix patterns
#[derive(Default)]
pub struct TokenTable {
    renderers: HashMap<char, Renderer>,
}

impl TokenTable {
    /// A table without any tokens
    pub fn empty() -> Self {
        Self::default()
    }

    /// The counter and date/time tokens
    pub fn standard() -> Self {
        Self::empty()
            .with_token('c', |s| s.counter.to_string())
            .with_token('Y', |s| format!("{:04}", rotated_at(s).year()))
            .with_token('m', |s| format!("{:02}", rotated_at(s).month()))
            .with_token('d', |s| format!("{:02}", rotated_at(s).day()))
            .with_token('H', |s| format!("{:02}", rotated_at(s).hour()))
            .with_token('M', |s| format!("{:02}", rotated_at(s).minute()))
            .with_token('S', |s| format!("{:02}", rotated_at(s).second()))
    }

    /// Add or replace the renderer for `%<token>`
    pub fn with_token<F>(mut self, token: char, render: F) -> Self
    where
        F: Fn(&State) -> String + Send + Sync + 'static,
    {
        self.renderers.insert(token, Box::new(render));
        self
    }

    /// Expand `pattern` against `state`
    pub fn expand(&self, state: &State, pattern: &str) -> String {
        pattern
            .split("%%")
            .map(|segment| self.expand_segment(state, segment))
            .collect::<Vec<_>>()
            .join("%")
    }

    fn expand_segment(&self, state: &State, segment: &str) -> String {
        let mut out = String::with_capacity(segment.len());
        let mut chars = segment.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.peek().and_then(|t| self.renderers.get(t)) {
                Some(render) => {
                    out.push_str(&render(state));
                    chars.next();
                }
                None => out.push('%'),
            }
        }

        out
    }
}

fn rotated_at(state: &State) -> DateTime<Utc> {
    state.rotated_at.unwrap_or_default()
}

/// Split the file name at its last dot: `app.log` -> (`app`, `.log`).
///
/// A name whose only dot is the leading one is all extension.
fn split_extension(path: &Path) -> (OsString, OsString) {
    let name = path.file_name().unwrap_or_default();
    match path.extension() {
        Some(ext) => {
            let mut dotted = OsString::from(".");
            dotted.push(ext);
            (path.file_stem().unwrap_or_default().to_os_string(), dotted)
        }
        None if name.as_encoded_bytes().first() == Some(&b'.') => {
            (OsString::new(), name.to_os_string())
        }
        None => (name.to_os_string(), OsString::new()),
    }
}

/// Names rotated files by inserting the expanded suffix before the extension
pub struct SuffixFileNameGenerator {
    tokens: TokenTable,
}

impl SuffixFileNameGenerator {
    pub fn new() -> Self {
        Self::with_tokens(TokenTable::standard())
    }

    pub fn with_tokens(tokens: TokenTable) -> Self {
        Self { tokens }
    }

    /// The expanded suffix pattern for `state`
    pub fn suffix(&self, state: &State) -> String {
        self.tokens.expand(state, &state.config.suffix)
    }
}

impl Default for SuffixFileNameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl FileNameGenerator for SuffixFileNameGenerator {
    fn file_name(&self, state: &State) -> PathBuf {
        let (mut rotated, ext) = split_extension(&state.full_name);
        rotated.push(".");
        rotated.push(self.suffix(state));
        rotated.push(ext);
        state.full_name.with_file_name(rotated)
    }
}
