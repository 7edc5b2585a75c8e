//! Append-only request log
//!
//! Every handled request is recorded with a timestamp, client address, and
//! outcome. Writes are best-effort: an unwritable log file must never affect
//! request handling, so I/O errors are reported at debug level and dropped.
//! Appends are serialized behind a single writer rather than relying on
//! OS-level atomic append semantics.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Best-effort append-only log of request outcomes
pub struct AuditLog {
    path: Option<PathBuf>,
    writer: Mutex<Option<File>>,
}

impl AuditLog {
    /// Open the log file for appending. A file that cannot be opened
    /// disables file logging for the lifetime of the process; the tracing
    /// stream still receives every entry.
    pub fn open(path: Option<&Path>) -> Self {
        let writer = path.and_then(|p| {
            match OpenOptions::new().create(true).append(true).open(p) {
                Ok(file) => Some(file),
                Err(e) => {
                    debug!(path = %p.display(), error = %e, "Request log file unavailable");
                    None
                }
            }
        });

        Self {
            path: path.map(Path::to_path_buf),
            writer: Mutex::new(writer),
        }
    }

    /// A log that never writes to disk, for tests and `--validate` runs
    pub fn disabled() -> Self {
        Self {
            path: None,
            writer: Mutex::new(None),
        }
    }

    /// Record one request outcome
    pub fn record(&self, client: &str, method: &str, path: &str, outcome: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{timestamp}] {client} {method} {path} {outcome}\n");
        self.append(&line);
    }

    /// Record a free-form message, matching the original log format for
    /// lifecycle events (startup, shutdown)
    pub fn message(&self, message: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{timestamp}] {message}\n");
        self.append(&line);
    }

    fn append(&self, line: &str) {
        let Ok(mut guard) = self.writer.lock() else {
            return;
        };
        if let Some(file) = guard.as_mut() {
            if let Err(e) = file.write_all(line.as_bytes()) {
                debug!(
                    path = ?self.path,
                    error = %e,
                    "Failed to append to request log"
                );
            }
        }
    }
}
