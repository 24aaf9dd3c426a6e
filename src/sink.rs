//! Durable failure log
//!
//! Every terminal failure is appended to a JSON-lines file the moment it
//! happens, so a crash after N failures still leaves all N on disk. The
//! file is truncated exactly once, before any worker is scheduled, which
//! is why initialization never races with appends.

use crate::Result;
use chrono::Utc;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// One structured failure entry
///
/// Self-contained: each record serializes to a single JSON line that can
/// be inspected without the rest of the file.
#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    /// Collection the failure belongs to
    pub collection: String,

    /// Page number at the time of failure (1-based; 0 when the failure
    /// happened before any page was requested)
    pub page: u32,

    /// Human-readable failure reason
    pub reason: String,

    /// Page reference in flight when the failure happened
    pub reference: Option<String>,

    /// RFC 3339 timestamp of the failure
    pub timestamp: String,
}

impl FailureRecord {
    pub fn new(collection: &str, page: u32, reason: String, reference: Option<String>) -> Self {
        Self {
            collection: collection.to_string(),
            page,
            reason,
            reference,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Append-only failure log shared by all workers
pub struct ErrorSink {
    path: PathBuf,
    file: Mutex<File>,
    recorded: AtomicUsize,
}

impl ErrorSink {
    /// Creates the sink, truncating any file left by a previous run
    ///
    /// Must be called before workers are scheduled.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            recorded: AtomicUsize::new(0),
        })
    }

    /// Appends one record and flushes it to disk immediately
    pub fn append(&self, record: &FailureRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;

        let mut file = self.file.lock().unwrap();
        writeln!(file, "{}", line)?;
        file.flush()?;
        drop(file);

        self.recorded.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(
            "Recorded failure for {} (page {}): {}",
            record.collection,
            record.page,
            record.reason
        );
        Ok(())
    }

    /// Number of records appended so far
    pub fn recorded(&self) -> usize {
        self.recorded.load(Ordering::Relaxed)
    }

    /// Whether the run has recorded no failures
    pub fn is_empty(&self) -> bool {
        self.recorded() == 0
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
