use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::pipeline::TableCounts;

/// Observer handed to every stage. Methods default to no-ops so callers only
/// implement what they care about. Must be `Sync`: the loader reports from rayon workers.
pub trait Reporter: Sync {
    fn files_discovered(&self, _root: &Path, _count: usize) {}

    fn file_loaded(&self, _path: &Path, _current: usize, _total: usize) {}

    fn file_failed(&self, _path: &Path, _err: &anyhow::Error) {}

    fn unrecognized_match_type(&self, _match_id: &str, _match_type: &str) {}

    fn duplicate_match(&self, _match_id: &str, _path: &Path) {}

    fn tables_built(&self, _counts: &TableCounts) {}

    fn table_written(&self, _name: &str, _path: &Path, _rows: usize) {}
}

/// Forwards every event to `tracing`; `main` installs the subscriber.
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn files_discovered(&self, root: &Path, count: usize) {
        tracing::info!(root = %root.display(), count, "found match files");
    }

    fn file_loaded(&self, path: &Path, current: usize, total: usize) {
        tracing::debug!(path = %path.display(), current, total, "parsed match file");
    }

    fn file_failed(&self, path: &Path, err: &anyhow::Error) {
        tracing::error!(path = %path.display(), "error processing file: {err:#}");
    }

    fn unrecognized_match_type(&self, match_id: &str, match_type: &str) {
        tracing::info!(match_id, match_type, "uncategorized match type, record dropped");
    }

    fn duplicate_match(&self, match_id: &str, path: &Path) {
        tracing::warn!(match_id, path = %path.display(), "duplicate match id, file skipped");
    }

    fn tables_built(&self, counts: &TableCounts) {
        tracing::info!(
            tests = counts.tests,
            odis = counts.odis,
            t20s = counts.t20s,
            deliveries = counts.deliveries,
            "built tables"
        );
    }

    fn table_written(&self, name: &str, path: &Path, rows: usize) {
        tracing::info!(table = name, path = %path.display(), rows, "saved table");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    FilesDiscovered(usize),
    FileLoaded(PathBuf),
    FileFailed(PathBuf),
    UnrecognizedMatchType { match_id: String, match_type: String },
    DuplicateMatch(String),
    TablesBuilt(TableCounts),
    TableWritten(String),
}

/// Keeps events in memory, mainly for tests.
#[derive(Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn push(&self, event: ReportEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}

impl Reporter for CollectingReporter {
    fn files_discovered(&self, _root: &Path, count: usize) {
        self.push(ReportEvent::FilesDiscovered(count));
    }

    fn file_loaded(&self, path: &Path, _current: usize, _total: usize) {
        self.push(ReportEvent::FileLoaded(path.to_path_buf()));
    }

    fn file_failed(&self, path: &Path, _err: &anyhow::Error) {
        self.push(ReportEvent::FileFailed(path.to_path_buf()));
    }

    fn unrecognized_match_type(&self, match_id: &str, match_type: &str) {
        self.push(ReportEvent::UnrecognizedMatchType {
            match_id: match_id.to_string(),
            match_type: match_type.to_string(),
        });
    }

    fn duplicate_match(&self, match_id: &str, _path: &Path) {
        self.push(ReportEvent::DuplicateMatch(match_id.to_string()));
    }

    fn tables_built(&self, counts: &TableCounts) {
        self.push(ReportEvent::TablesBuilt(counts.clone()));
    }

    fn table_written(&self, name: &str, _path: &Path, _rows: usize) {
        self.push(ReportEvent::TableWritten(name.to_string()));
    }
}
