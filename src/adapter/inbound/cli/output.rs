//! CLI output formatting.
//!
//! Human-readable output uses colored symbols and indented fields. With
//! `--json` every command prints exactly one JSON document on stdout, so
//! scripts can pipe it straight into `jq`. Errors always go to stderr.

use std::fmt::Display;
use std::sync::OnceLock;

use owo_colors::{OwoColorize, Stream};
use parking_lot::RwLock;
use serde_json::json;

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
    /// Verbosity level (0 = normal, 1+ = increasingly verbose).
    pub verbose: u8,
}

impl OutputConfig {
    /// Create a new output configuration.
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
        }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    *config_cell().read()
}

/// Human output is suppressed in quiet mode; JSON never is.
fn suppressed(config: OutputConfig) -> bool {
    !config.json && config.quiet
}

/// Apply output settings from global CLI flags.
///
/// Call this early in the CLI entry point. `color` forces styling on or off;
/// `None` leaves it to terminal detection.
pub fn configure(config: OutputConfig, color: Option<bool>) {
    *config_cell().write() = config;
    match color {
        Some(enabled) => owo_colors::set_override(enabled),
        None => owo_colors::unset_override(),
    }
}

/// Return whether machine-readable JSON output is enabled.
#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

/// Return the global verbosity level from `-v` flags.
#[must_use]
pub fn verbosity() -> u8 {
    read_config().verbose
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    if suppressed(read_config()) || is_json() {
        return;
    }
    let label = format!("{label:<14}");
    println!(
        "  {} {}",
        label.if_supports_color(Stream::Stdout, |t| t.dimmed()),
        value
    );
}

/// Print a success line.
pub fn success(message: &str) {
    if suppressed(read_config()) || is_json() {
        return;
    }
    println!(
        "{} {}",
        "✓".if_supports_color(Stream::Stdout, |t| t.green()),
        message
    );
}

/// Print a warning line.
pub fn warning(message: &str) {
    if is_json() {
        return;
    }
    println!(
        "{} {}",
        "⚠".if_supports_color(Stream::Stdout, |t| t.yellow()),
        message
    );
}

/// Print an error line to stderr.
pub fn error(message: &str, kind: Option<&str>) {
    if is_json() {
        eprintln!(
            "{}",
            json!({
                "error": {
                    "message": message,
                    "kind": kind,
                },
            })
        );
        return;
    }
    eprintln!(
        "{} {}",
        "×".if_supports_color(Stream::Stderr, |t| t.red()),
        message
    );
}

/// Print a section header.
pub fn section(title: &str) {
    if suppressed(read_config()) || is_json() {
        return;
    }
    println!();
    println!("{}", title.if_supports_color(Stream::Stdout, |t| t.bold()));
}

/// Print a dimmed note.
pub fn note(message: &str) {
    if suppressed(read_config()) || is_json() {
        return;
    }
    println!(
        "  {}",
        message.if_supports_color(Stream::Stdout, |t| t.dimmed())
    );
}

/// Print multiple lines of content, each indented.
pub fn lines(content: &str) {
    if suppressed(read_config()) || is_json() {
        return;
    }
    for line in content.lines() {
        println!("  {line}");
    }
}

/// Emit the JSON document for a command.
pub fn json_output(value: serde_json::Value) {
    println!("{value}");
}

/// Format a positive value in green.
pub fn positive(value: impl Display) -> String {
    let value = value.to_string();
    format!("{}", value.if_supports_color(Stream::Stdout, |t| t.green()))
}

/// Format a negative value in red.
pub fn negative(value: impl Display) -> String {
    let value = value.to_string();
    format!("{}", value.if_supports_color(Stream::Stdout, |t| t.red()))
}

/// Format a highlighted value in cyan.
pub fn highlight(value: impl Display) -> String {
    let value = value.to_string();
    format!("{}", value.if_supports_color(Stream::Stdout, |t| t.cyan()))
}
