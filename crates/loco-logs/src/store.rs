//! Rotation state persistence
//!
//! The file store keeps one JSON record per tracked file. Record names are
//! the MD5 of the tracked file's absolute path, so arbitrary paths map to
//! flat, filesystem-safe names.

use loco_core::{constants, Error, Result, State};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Result of listing a store
#[derive(Debug, Default)]
pub struct Listing {
    /// Records that decoded successfully, ordered by tracked path
    pub states: Vec<State>,
    /// Records that exist but could not be read or decoded
    pub skipped: Vec<PathBuf>,
}

/// Durable storage for [`State`] records, keyed by tracked path
pub trait StateStore: Send + Sync {
    /// Insert or overwrite the record for `state.full_name`
    fn store(&self, state: &State) -> Result<()>;

    /// Load the record for a tracked path
    fn load(&self, full_name: &Path) -> Result<State>;

    /// All readable records; unreadable ones are reported, not fatal
    fn list(&self) -> Result<Listing>;

    /// Delete the record for a tracked path
    fn remove(&self, full_name: &Path) -> Result<()>;
}

/// Record file name for a tracked path
pub fn record_name(full_name: &Path) -> String {
    let digest = md5::compute(full_name.as_os_str().as_encoded_bytes());
    format!("{:x}.{}", digest, constants::STATE_EXTENSION)
}

/// Directory-backed store, one JSON file per tracked path
#[derive(Debug, Clone)]
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// The store under the loco home directory
    pub fn in_home() -> Self {
        Self::new(constants::states_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, full_name: &Path) -> PathBuf {
        self.dir.join(record_name(full_name))
    }

    fn read_record(&self, path: &Path) -> Result<State> {
        let bytes = fs::read(path)
            .map_err(|e| Error::io(format!("Cannot read state record {}", path.display()), e))?;
        serde_json::from_slice(&bytes).map_err(|e| Error::Decode {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl StateStore for FileStateStore {
    fn store(&self, state: &State) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| Error::io(format!("Cannot create {}", self.dir.display()), e))?;

        let path = self.record_path(&state.full_name);
        let tmp = path.with_extension(format!("{}.tmp", constants::STATE_EXTENSION));
        let bytes = serde_json::to_vec(state)?;

        // Write aside then rename, a reader never sees a half-written record
        fs::write(&tmp, bytes)
            .map_err(|e| Error::io(format!("Cannot write state record {}", tmp.display()), e))?;
        fs::rename(&tmp, &path)
            .map_err(|e| Error::io(format!("Cannot replace state record {}", path.display()), e))?;

        debug!("Stored state for {:?} in {:?}", state.full_name, path);
        Ok(())
    }

    fn load(&self, full_name: &Path) -> Result<State> {
        let path = self.record_path(full_name);
        if !path.exists() {
            return Err(Error::StateNotFound(full_name.to_path_buf()));
        }
        self.read_record(&path)
    }

    fn list(&self) -> Result<Listing> {
        let mut listing = Listing::default();

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(listing),
            Err(e) => {
                return Err(Error::io(format!("Cannot list {}", self.dir.display()), e));
            }
        };

        for entry in entries {
            let path = entry?.path();
            let is_record = path
                .extension()
                .map(|ext| ext == constants::STATE_EXTENSION)
                .unwrap_or(false);
            if !is_record || !path.is_file() {
                continue;
            }

            match self.read_record(&path) {
                Ok(state) => listing.states.push(state),
                Err(e) => {
                    warn!("Skipping state record: {}", e);
                    listing.skipped.push(path);
                }
            }
        }

        listing.states.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(listing)
    }

    fn remove(&self, full_name: &Path) -> Result<()> {
        let path = self.record_path(full_name);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed state for {:?}", full_name);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::StateNotFound(full_name.to_path_buf()))
            }
            Err(e) => Err(Error::io(
                format!("Cannot remove state record {}", path.display()),
                e,
            )),
        }
    }
}

/// In-memory store, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    states: Mutex<HashMap<PathBuf, State>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.lock().is_empty()
    }
}

impl StateStore for MemoryStateStore {
    fn store(&self, state: &State) -> Result<()> {
        self.states
            .lock()
            .insert(state.full_name.clone(), state.clone());
        Ok(())
    }

    fn load(&self, full_name: &Path) -> Result<State> {
        self.states
            .lock()
            .get(full_name)
            .cloned()
            .ok_or_else(|| Error::StateNotFound(full_name.to_path_buf()))
    }

    fn list(&self) -> Result<Listing> {
        let mut states: Vec<State> = self.states.lock().values().cloned().collect();
        states.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(Listing {
            states,
            skipped: Vec::new(),
        })
    }

    fn remove(&self, full_name: &Path) -> Result<()> {
        self.states
            .lock()
            .remove(full_name)
            .map(|_| ())
            .ok_or_else(|| Error::StateNotFound(full_name.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use loco_core::{Config, Interval};
    use tempfile::TempDir;

    fn state(full_name: &str, interval: &str, counter: u64) -> State {
        State {
            full_name: PathBuf::from(full_name),
            created_at: Some(Utc.timestamp_nanos(10_000)),
            rotated_at: Some(Utc.timestamp_nanos(20_000)),
            counter,
            config: Config::new(Interval::parse(interval).unwrap(), "%Y%m%d"),
        }
    }

    #[test]
    fn test_record_name_is_md5_of_path() {
        assert_eq!(
            record_name(Path::new("/path/to/file.log")),
            "e789bf22faae2374879bd5a6922fe558.json"
        );
        assert_eq!(
            record_name(Path::new("foo")),
            "acbd18db4cc2f85cedef654fccc4a4d8.json"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_record_name_keeps_non_utf8_paths_apart() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let a = Path::new(OsStr::from_bytes(b"/var/log/\xe9.log"));
        let b = Path::new(OsStr::from_bytes(b"/var/log/\xe8.log"));
        assert_ne!(record_name(a), record_name(b));
    }

    #[test]
    fn test_load_missing_state() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path());
        let err = store.load(Path::new("/path/to/file")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_store_and_load() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join("logfiles"));
        let expected = state("/path/to/file", "3w", 42);

        store.store(&expected).unwrap();
        let actual = store.load(Path::new("/path/to/file")).unwrap();
        assert_eq!(actual, expected);

        // No temporary files left behind
        let names: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_store_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path());
        store.store(&state("/path/to/file", "1d", 1)).unwrap();
        store.store(&state("/path/to/file", "1d", 2)).unwrap();
        assert_eq!(store.load(Path::new("/path/to/file")).unwrap().counter, 2);
        assert_eq!(store.list().unwrap().states.len(), 1);
    }

    #[test]
    fn test_list_states() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path());
        store.store(&state("/path/to/file", "2d", 42)).unwrap();
        store.store(&state("/path/to/another/file", "2d", 77)).unwrap();

        let listing = store.list().unwrap();
        assert_eq!(listing.states.len(), 2);
        assert!(listing.skipped.is_empty());
        assert_eq!(listing.states[0].full_name, PathBuf::from("/path/to/another/file"));
        assert_eq!(listing.states[1].counter, 42);
    }

    #[test]
    fn test_list_missing_directory() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join("never-created"));
        let listing = store.list().unwrap();
        assert!(listing.states.is_empty());
        assert!(listing.skipped.is_empty());
    }

    #[test]
    fn test_list_skips_corrupt_records() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path());
        store.store(&state("/path/to/file", "2d", 1)).unwrap();
        let corrupt = dir.path().join("0123456789abcdef0123456789abcdef.json");
        fs::write(&corrupt, b"{ \"fullName\": ").unwrap();
        fs::write(dir.path().join("README"), b"not a record").unwrap();

        let listing = store.list().unwrap();
        assert_eq!(listing.states.len(), 1);
        assert_eq!(listing.skipped, vec![corrupt]);
    }

    #[test]
    fn test_load_corrupt_record() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path());
        let full_name = Path::new("/path/to/file");
        fs::write(dir.path().join(record_name(full_name)), b"garbage").unwrap();
        assert!(matches!(store.load(full_name), Err(Error::Decode { .. })));
    }

    #[test]
    fn test_remove_state() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path());
        store.store(&state("/path/to/file", "2d", 42)).unwrap();
        assert_eq!(store.list().unwrap().states.len(), 1);

        store.remove(Path::new("/path/to/file")).unwrap();
        assert!(store.list().unwrap().states.is_empty());

        let err = store.remove(Path::new("/path/to/file")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStateStore::new();
        assert!(store.is_empty());
        assert!(store.load(Path::new("/a")).unwrap_err().is_not_found());

        store.store(&state("/b", "1h", 0)).unwrap();
        store.store(&state("/a", "1h", 3)).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.load(Path::new("/a")).unwrap().counter, 3);

        let listing = store.list().unwrap();
        assert_eq!(listing.states[0].full_name, PathBuf::from("/a"));

        store.remove(Path::new("/a")).unwrap();
        assert!(store.remove(Path::new("/a")).unwrap_err().is_not_found());
        assert_eq!(store.len(), 1);
    }
}
