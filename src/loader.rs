use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use serde_json::Value;
use walkdir::WalkDir;

use crate::report::Reporter;

/// One parsed source file, still in its nested form.
#[derive(Debug, Clone)]
pub struct RawMatch {
    pub path: PathBuf,
    pub value: Value,
}

/// Files with a matching extension, in file-name order, plus the number of
/// entries the walk could not read (broken links, unreadable directories).
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub files: Vec<PathBuf>,
    pub unreadable: usize,
}

pub fn discover_files(root: &Path, ext: &str, reporter: &dyn Reporter) -> Result<Discovery> {
    if !root.is_dir() {
        return Err(anyhow!("input directory {} does not exist", root.display()));
    }
    let ext = ext.trim_start_matches('.');

    let mut out = Discovery::default();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                out.unreadable += 1;
                reporter.file_failed(&path, &anyhow!(err));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let matches_ext = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if matches_ext {
            out.files.push(entry.into_path());
        }
    }
    reporter.files_discovered(root, out.files.len());
    Ok(out)
}

/// Discover and parse every match file under `root`. Unreadable or invalid
/// files are reported and skipped; the returned order is traversal order.
pub fn load_records(
    root: &Path,
    ext: &str,
    threads: usize,
    reporter: &dyn Reporter,
) -> Result<LoadOutcome> {
    let Discovery { files, unreadable } = discover_files(root, ext, reporter)?;
    let total = files.len();
    let done = AtomicUsize::new(0);

    let parse_all = || {
        files
            .par_iter()
            .map(|path| {
                let parsed = parse_match_file(path);
                let current = done.fetch_add(1, Ordering::Relaxed) + 1;
                reporter.file_loaded(path, current, total);
                parsed
            })
            .collect::<Vec<_>>()
    };
    let results = with_load_pool(threads, parse_all);

    let mut records = Vec::with_capacity(total);
    let mut failed = unreadable;
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(value) => records.push(RawMatch {
                path: path.clone(),
                value,
            }),
            Err(err) => {
                failed += 1;
                reporter.file_failed(path, &err);
            }
        }
    }

    Ok(LoadOutcome {
        discovered: total + unreadable,
        failed,
        records,
    })
}

/// `failed` covers both walk errors and files that did not parse; walk errors
/// are also counted in `discovered`.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub discovered: usize,
    pub failed: usize,
    pub records: Vec<RawMatch>,
}

pub fn parse_match_file(path: &Path) -> Result<Value> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read match file {}", path.display()))?;
    parse_match_json(&raw).with_context(|| format!("parse match file {}", path.display()))
}

pub fn parse_match_json(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw.trim()).context("invalid match json")?;
    if !value.is_object() {
        return Err(anyhow!("match json must be an object"));
    }
    Ok(value)
}

fn with_load_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}
