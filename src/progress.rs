//! Index-build progress reporting.
//!
//! The indexer reports a completed fraction in `[0, 1]` after each finished
//! page unit. Reporting is fire-and-forget: a lost event has no correctness
//! impact. Progress is emitted on **stderr** so stdout remains parseable for
//! scripts.

use std::io::Write;

/// Receives completion fractions from the indexer. Implementations write to
/// stderr (human or JSON) or discard events; no acknowledgment is expected.
pub trait ProgressObserver: Send + Sync {
    fn report(&self, completed: f64);
}

/// Human-friendly progress on stderr: "indexing   42%".
pub struct StderrProgress;

impl ProgressObserver for StderrProgress {
    fn report(&self, completed: f64) {
        let line = format!("\rindexing  {:>3.0}%", completed * 100.0);
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        if completed >= 1.0 {
            let _ = stderr.write_all(b"\n");
        }
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressObserver for JsonProgress {
    fn report(&self, completed: f64) {
        let obj = serde_json::json!({
            "event": "progress",
            "completed": completed
        });
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        }
    }
}

/// No-op observer when progress is disabled.
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn report(&self, _completed: f64) {}
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build an observer for this mode. Caller passes it to the indexer.
    pub fn observer(&self) -> Box<dyn ProgressObserver> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
