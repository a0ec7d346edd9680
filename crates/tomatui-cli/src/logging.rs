//! Debug logging setup.
//!
//! The TUI owns the terminal, so log output goes to a `debug.log` file in
//! the working directory, and only when `TOMATUI_DEBUG` is set. Without it
//! tracing events are simply discarded.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Install the tracing subscriber if `TOMATUI_DEBUG` is set.
///
/// `TOMATUI_DEBUG=1` enables debug-level output; any other non-empty value
/// is taken as a tracing filter string (e.g. `tomatui_core=trace`).
pub fn init() {
    let Ok(value) = std::env::var("TOMATUI_DEBUG") else {
        return;
    };
    if value.is_empty() {
        return;
    }

    let filter = match value.as_str() {
        "1" | "true" => EnvFilter::new("debug"),
        directives => EnvFilter::new(directives),
    };

    let file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
    {
        Ok(file) => file,
        Err(err) => {
            eprintln!("error: cannot open debug.log: {err}");
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}
