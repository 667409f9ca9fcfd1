//! Output formatting

use colored::Colorize;
use loco_core::{Config, State};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

/// Global flag for JSON output mode
static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// Enable or disable JSON output mode
pub fn set_json_mode(enabled: bool) {
    JSON_MODE.store(enabled, Ordering::SeqCst);
}

/// Check if JSON output mode is enabled
pub fn is_json_mode() -> bool {
    JSON_MODE.load(Ordering::SeqCst)
}

#[derive(Tabled)]
pub struct StateRow {
    #[tabled(rename = "FILE")]
    pub file: String,
    #[tabled(rename = "CREATED AT")]
    pub created_at: String,
    #[tabled(rename = "ROTATED AT")]
    pub rotated_at: String,
    #[tabled(rename = "INTERVAL")]
    pub interval: String,
    #[tabled(rename = "SUFFIX")]
    pub suffix: String,
    #[tabled(rename = "COUNTER")]
    pub counter: u64,
}

impl From<&State> for StateRow {
    fn from(state: &State) -> Self {
        StateRow {
            file: state.full_name.display().to_string(),
            created_at: state.pretty_created_at(),
            rotated_at: state.pretty_rotated_at(),
            interval: state.config.interval.to_string(),
            suffix: state.config.suffix.clone(),
            counter: state.counter,
        }
    }
}

/// JSON representation of the default settings
#[derive(Serialize)]
pub struct DefaultsJson {
    pub interval: String,
    pub suffix: String,
}

impl From<&Config> for DefaultsJson {
    fn from(config: &Config) -> Self {
        DefaultsJson {
            interval: config.interval.to_string(),
            suffix: config.suffix.clone(),
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing to JSON: {}", e),
    }
}

pub fn render_states(states: &[State]) -> String {
    let rows: Vec<StateRow> = states.iter().map(StateRow::from).collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(5)).with(Alignment::right()))
        .to_string()
}

pub fn print_states(states: &[State]) {
    if is_json_mode() {
        print_json(states);
        return;
    }

    if states.is_empty() {
        println!("No registered log files");
        return;
    }

    println!("{}", render_states(states));
}

pub fn print_registered(state: &State) {
    if is_json_mode() {
        print_json(state);
        return;
    }

    print_success(&format!(
        "{} rotates every {} (suffix {})",
        state.full_name.display(),
        state.config.interval,
        state.config.suffix
    ));
}

pub fn print_defaults(config: &Config) {
    if is_json_mode() {
        print_json(&DefaultsJson::from(config));
        return;
    }

    println!("  {} │ {}", "Interval".bold(), config.interval);
    println!("  {} │ {}", "Suffix  ".bold(), config.suffix);
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "!".yellow(), message);
}
