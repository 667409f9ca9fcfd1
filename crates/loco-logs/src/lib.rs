//! loco logs - rotation state storage, rotated file naming and the rotating writer

mod clock;
mod rotation;
mod store;
mod writer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use rotation::{FileNameGenerator, SuffixFileNameGenerator, TokenTable};
pub use store::{record_name, FileStateStore, Listing, MemoryStateStore, StateStore};
pub use writer::LogWriter;

use loco_core::{Config, Result, State};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Register a tracked file, or change the settings of a registered one.
///
/// Re-registering keeps the file's counter and timestamps.
pub fn register(store: &dyn StateStore, full_name: &Path, config: Config) -> Result<State> {
    let state = match store.load(full_name) {
        Ok(mut state) => {
            debug!("Reconfiguring {:?}", full_name);
            state.reconfigure(config);
            state
        }
        Err(e) if e.is_not_found() => State::new(full_name, config),
        Err(e) => return Err(e),
    };
    store.store(&state)?;
    Ok(state)
}

fn home_store() -> Arc<dyn StateStore> {
    Arc::new(FileStateStore::in_home())
}

/// New writer for `full_name` with a fresh state in the home store
pub fn new_writer<P: Into<PathBuf>>(full_name: P, config: Config) -> Result<LogWriter> {
    LogWriter::create(home_store(), full_name, config)
}

/// Writer for a file registered in the home store
pub fn load_writer(full_name: &Path) -> Result<LogWriter> {
    LogWriter::load(home_store(), full_name)
}

/// All states in the home store
pub fn list_states() -> Result<Listing> {
    FileStateStore::in_home().list()
}

/// Forget a tracked file (the log file itself is left alone)
pub fn remove_state(full_name: &Path) -> Result<()> {
    FileStateStore::in_home().remove(full_name)
}
