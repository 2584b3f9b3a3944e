//! Buffered removal log.
//!
//! Removal reports for a run are buffered in memory and written to the
//! log file exactly once, when the log is dropped at the end of the run.
//! Dropping flushes on every exit path, including the error path, so the
//! file is never left holding a partial run.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::error;

const SEPARATOR_LENGTH: usize = 127;
const LOG_FILE_NAME: &str = "deletelog.txt";

/// Per-run removal log, appended to `<dir>/deletelog.txt` on drop.
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
    lines: Vec<String>,
}

impl RunLog {
    /// Create a log buffering into the given directory.
    pub fn open(dir: &Path) -> Self {
        Self {
            path: dir.join(LOG_FILE_NAME),
            lines: Vec::new(),
        }
    }

    /// Buffer one report line.
    pub fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all buffered lines, preceded by a separator and a
    /// timestamped header. Clears the buffer; a no-op when empty.
    pub fn flush(&mut self) -> std::io::Result<()> {
        if self.lines.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        writeln!(file, "{}", "-".repeat(SEPARATOR_LENGTH))?;
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        for (i, line) in self.lines.iter().enumerate() {
            if i == 0 {
                writeln!(file, "{} - {}", timestamp, line)?;
            } else {
                writeln!(file, "{}", line)?;
            }
        }
        file.flush()?;

        self.lines.clear();
        Ok(())
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            error!("Failed to write removal log {}: {}", self.path.display(), e);
        }
    }
}
