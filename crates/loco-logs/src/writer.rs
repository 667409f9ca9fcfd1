//! Log writer with time-based rotation
//!
//! Every write re-evaluates the tracked file's [`State`]:
//! - never created: create the live file (append, never truncate), stamp
//!   creation time, persist
//! - more than one interval since the last rotation: move the live file to
//!   its rotated name, bump the counter, persist, start a fresh live file
//! - otherwise: append, opening the live file lazily
//!
//! There is no timer; an idle file is only rotated by the next write.

use chrono::{DateTime, Utc};
use loco_core::{Config, Error, Result, State};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::rotation::{FileNameGenerator, SuffixFileNameGenerator};
use crate::store::StateStore;

/// Appends to a tracked file, rotating it when its interval elapses.
///
/// One writer per tracked path; it is not meant to be shared between
/// threads or processes writing the same file.
pub struct LogWriter {
    state: State,
    writer: Option<BufWriter<File>>,
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    file_names: Box<dyn FileNameGenerator>,
}

impl LogWriter {
    /// Register `full_name` with a fresh state and return its writer
    pub fn create<P: Into<PathBuf>>(
        store: Arc<dyn StateStore>,
        full_name: P,
        config: Config,
    ) -> Result<Self> {
        let state = State::new(full_name, config);
        store.store(&state)?;
        debug!("Registered {:?}", state.full_name);
        Ok(Self::from_state(store, state))
    }

    /// Writer for an already registered file
    pub fn load(store: Arc<dyn StateStore>, full_name: &Path) -> Result<Self> {
        let state = store.load(full_name)?;
        Ok(Self::from_state(store, state))
    }

    pub fn from_state(store: Arc<dyn StateStore>, state: State) -> Self {
        Self {
            state,
            writer: None,
            store,
            clock: Arc::new(SystemClock),
            file_names: Box::new(SuffixFileNameGenerator::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_file_name_generator(mut self, file_names: Box<dyn FileNameGenerator>) -> Self {
        self.file_names = file_names;
        self
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Whether the live file is currently open
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Write all of `buf`, creating or rotating the live file first if due
    pub fn append(&mut self, buf: &[u8]) -> Result<usize> {
        let now = self.clock.now();

        if self.state.must_be_created() {
            self.create_file(now)?;
        } else if self.state.must_be_rotated(now) {
            self.rotate(now)?;
        }

        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => self.open()?,
        };
        let writer = self.writer.insert(writer);

        let written = writer.write_all(buf).and_then(|_| writer.flush());
        written.map_err(|e| {
            Error::io(format!("Cannot write to {}", self.state.full_name.display()), e)
        })?;

        Ok(buf.len())
    }

    /// Close the live file. Safe to call any number of times.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .map_err(|e| Error::io(format!("Cannot flush {}", self.state.full_name.display()), e))?;
            debug!("Closed {:?}", self.state.full_name);
        }
        Ok(())
    }

    fn open(&self) -> Result<BufWriter<File>> {
        let path = &self.state.full_name;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::io(format!("Cannot open log file {}", path.display()), e))?;
        Ok(BufWriter::new(file))
    }

    fn create_file(&mut self, now: DateTime<Utc>) -> Result<()> {
        if let Some(parent) = self.state.full_name.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| Error::io(format!("Cannot create {}", parent.display()), e))?;
            }
        }

        let writer = self.open()?;

        let mut created = self.state.clone();
        created.mark_created(now);
        self.store.store(&created)?;

        debug!("Created log file {:?}", created.full_name);
        self.state = created;
        self.writer = Some(writer);
        Ok(())
    }

    fn rotate(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.close()?;

        // Name is derived from the state of the period being closed
        let target = self.file_names.file_name(&self.state);

        let previous = self.state.clone();
        let mut rotated = self.state.clone();
        rotated.mark_rotated(now);

        // Persist before touching files: a crash after this point can delay
        // a rotation but never rename twice onto the same target
        self.store.store(&rotated)?;
        self.state = rotated;

        match self.move_live_file(&target).and_then(|_| self.open()) {
            Ok(writer) => {
                info!(
                    "Rotated {:?} to {:?} (rotation {})",
                    self.state.full_name, target, self.state.counter
                );
                self.writer = Some(writer);
                Ok(())
            }
            Err(e) => {
                self.state = previous;
                if let Err(restore) = self.store.store(&self.state) {
                    warn!(
                        "Cannot restore state of {:?} after failed rotation: {}",
                        self.state.full_name, restore
                    );
                }
                Err(e)
            }
        }
    }

    fn move_live_file(&self, target: &Path) -> Result<()> {
        let live = &self.state.full_name;
        if !live.exists() {
            debug!("Live file {:?} is gone, nothing to rotate", live);
            return Ok(());
        }
        fs::rename(live, target).map_err(|e| {
            Error::io(
                format!("Cannot rename {} to {}", live.display(), target.display()),
                e,
            )
        })
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf).map_err(into_io_error)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close {:?}: {}", self.state.full_name, e);
        }
    }
}

fn into_io_error(err: Error) -> io::Error {
    let kind = match &err {
        Error::Io { source, .. } => source.kind(),
        _ => io::ErrorKind::Other,
    };
    match err {
        Error::IoError(e) => e,
        other => io::Error::new(kind, other),
    }
}
