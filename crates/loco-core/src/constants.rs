//! Constants and default values for loco

use std::path::PathBuf;

/// Default loco home directory name
pub const LOCO_DIR: &str = ".loco";

/// Directory (under the loco home) holding one state record per tracked file
pub const STATES_DIR: &str = "logfiles";

/// User defaults file name
pub const DEFAULTS_FILE: &str = "defaults.json";

/// Extension of persisted state records
pub const STATE_EXTENSION: &str = "json";

/// Environment variable overriding the default interval
pub const ENV_INTERVAL: &str = "LOCO_INTERVAL";

/// Environment variable overriding the default suffix
pub const ENV_SUFFIX: &str = "LOCO_SUFFIX";

/// Built-in rotation interval
pub const DEFAULT_INTERVAL: &str = "1d";

/// Built-in rotated file suffix (the rotation counter)
pub const DEFAULT_SUFFIX: &str = "%c";

/// Get the loco home directory
pub fn loco_home() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(LOCO_DIR))
        .unwrap_or_else(|| PathBuf::from(LOCO_DIR))
}

/// Get the state records directory
pub fn states_dir() -> PathBuf {
    loco_home().join(STATES_DIR)
}

/// Get the user defaults file path
pub fn defaults_path() -> PathBuf {
    loco_home().join(DEFAULTS_FILE)
}
