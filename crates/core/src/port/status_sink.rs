// Status Sink Port - the line protocol read by whoever launched the batch
//
// Lines are plain text on stdout. Consumers key on the `ERROR RUN: ` prefix,
// so its wording must not change.

use crate::domain::RunIndex;
use std::io::Write;
use std::path::Path;

/// Prefix of the per-run failure line
pub const RUN_FAILED_PREFIX: &str = "ERROR RUN: ";

/// `ERROR RUN: {index}`
pub fn run_failed_line(index: RunIndex) -> String {
    format!("{}{}", RUN_FAILED_PREFIX, index)
}

/// `Unable to open {path}`
pub fn list_unreadable_line(path: &Path) -> String {
    format!("Unable to open {}", path.display())
}

/// Receiver of user-visible status lines
pub trait StatusSink: Send + Sync {
    /// An input list could not be opened; the batch is about to abort
    fn list_unreadable(&self, path: &Path);

    /// A run was classified as failed
    fn run_failed(&self, index: RunIndex);
}

/// Writes status lines to stdout, flushing after each line
pub struct StdoutStatusSink;

impl StdoutStatusSink {
    fn emit(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        // A closed stdout must not take the batch down with it
        if writeln!(out, "{}", line).and_then(|_| out.flush()).is_err() {
            tracing::warn!(line = %line, "Failed to write status line to stdout");
        }
    }
}

impl StatusSink for StdoutStatusSink {
    fn list_unreadable(&self, path: &Path) {
        self.emit(&list_unreadable_line(path));
    }

    fn run_failed(&self, index: RunIndex) {
        self.emit(&run_failed_line(index));
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every emitted line in memory
    #[derive(Default)]
    pub struct RecordingStatusSink {
        lines: Mutex<Vec<String>>,
    }

    impl RecordingStatusSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }

        /// Indices parsed back out of `ERROR RUN:` lines, in emission order
        pub fn failed_indices(&self) -> Vec<u64> {
            self.lines()
                .iter()
                .filter_map(|line| line.strip_prefix(RUN_FAILED_PREFIX))
                .filter_map(|index| index.trim().parse().ok())
                .collect()
        }

        fn push(&self, line: String) {
            self.lines.lock().unwrap().push(line);
        }
    }

    impl StatusSink for RecordingStatusSink {
        fn list_unreadable(&self, path: &Path) {
            self.push(list_unreadable_line(path));
        }

        fn run_failed(&self, index: RunIndex) {
            self.push(run_failed_line(index));
        }
    }
}
