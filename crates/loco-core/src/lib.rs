//! loco core - shared types, interval parsing, configuration defaults and errors

pub mod config;
pub mod constants;
pub mod error;
pub mod interval;
pub mod types;

pub use config::*;
pub use constants::*;
pub use error::{Error, Result};
pub use interval::Interval;
pub use types::*;
