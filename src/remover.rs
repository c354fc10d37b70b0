//! Moves files into the trash staging directory.
//!
//! Nothing is ever deleted: every removed file is renamed to
//! `<trash>/<epoch millis>_<file name>` and can be moved back by hand.

use std::fs;
use std::path::{Path, PathBuf};

use indicatif::HumanBytes;
use log::{info, warn};
use serde::Serialize;
use time::OffsetDateTime;
use walkdir::WalkDir;

use crate::error::{Result, SweepError};

/// Where a removed file ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrashRecord {
    pub original: PathBuf,
    pub staged: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalFailure {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RemovalReport {
    pub moved: Vec<TrashRecord>,
    pub failures: Vec<RemovalFailure>,
}

impl RemovalReport {
    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }

    pub fn summary(&self) -> String {
        format!("Moved {} files to Trash", self.moved_count())
    }
}

fn epoch_millis() -> i128 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}

/// First free `<millis>_<name>` (or `<millis>-<n>_<name>`) slot in `trash_root`.
///
/// Only guards against collisions this process can see; two processes
/// staging the same name in the same millisecond can still race.
fn staging_path(trash_root: &Path, millis: i128, name: &str) -> PathBuf {
    let mut candidate = trash_root.join(format!("{millis}_{name}"));
    let mut n = 1;
    while candidate.symlink_metadata().is_ok() {
        candidate = trash_root.join(format!("{millis}-{n}_{name}"));
        n += 1;
    }
    candidate
}

fn move_one(path: &Path, trash_root: &Path) -> std::io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name")
    })?;
    // Fail before picking a slot so a vanished file doesn't look like a collision.
    path.symlink_metadata()?;
    let staged = staging_path(trash_root, epoch_millis(), &name.to_string_lossy());
    fs::rename(path, &staged)?;
    Ok(staged)
}

/// Moves each of `paths` into `trash_root`, creating it when needed.
///
/// A file that cannot be moved is recorded in
/// [`RemovalReport::failures`]; the rest of the batch still runs.
pub fn remove<P: AsRef<Path>>(paths: &[P], trash_root: &Path) -> Result<RemovalReport> {
    if paths.is_empty() {
        return Err(SweepError::EmptyRequest);
    }

    fs::create_dir_all(trash_root).map_err(|source| SweepError::TrashUnavailable {
        path: trash_root.to_path_buf(),
        source,
    })?;

    let mut report = RemovalReport::default();
    for path in paths {
        let path = path.as_ref();
        match move_one(path, trash_root) {
            Ok(staged) => {
                info!("Moved '{}' to '{}'", path.display(), staged.display());
                report.moved.push(TrashRecord {
                    original: path.to_path_buf(),
                    staged,
                });
            }
            Err(e) => {
                warn!("Failed to move '{}' to trash: {}", path.display(), e);
                report.failures.push(RemovalFailure {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "{} ({} failed)",
        report.summary(),
        report.failures.len()
    );
    Ok(report)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StagingUsage {
    pub entries: u64,
    pub bytes: u64,
}

/// Counts what currently sits in the staging directory.
///
/// A staging directory that was never created is simply empty.
pub fn staging_usage(trash_root: &Path) -> Result<StagingUsage> {
    let mut usage = StagingUsage::default();
    if !trash_root.exists() {
        return Ok(usage);
    }

    for entry in WalkDir::new(trash_root).min_depth(1) {
        let entry = entry.map_err(|e| SweepError::Io(e.into()))?;
        if entry.depth() == 1 {
            usage.entries += 1;
        }
        if entry.file_type().is_file() {
            usage.bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }

    info!(
        "Trash staging '{}' holds {} entries ({})",
        trash_root.display(),
        usage.entries,
        HumanBytes(usage.bytes)
    );
    Ok(usage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_request_is_rejected() {
        let dir = tempdir().unwrap();
        let trash = dir.path().join("trash");
        let paths: Vec<PathBuf> = Vec::new();
        assert!(matches!(remove(&paths, &trash), Err(SweepError::EmptyRequest)));
        assert!(!trash.exists());
    }

    #[test]
    fn same_millisecond_names_do_not_collide() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("5_a.txt"), b"taken").unwrap();
        let slot = staging_path(dir.path(), 5, "a.txt");
        assert_eq!(slot, dir.path().join("5-1_a.txt"));
        assert!(slot.to_string_lossy().ends_with("_a.txt"));
    }

    #[test]
    fn identically_named_files_from_different_dirs() {
        let dir = tempdir().unwrap();
        let trash = dir.path().join("trash");
        let a = dir.path().join("one/report.pdf");
        let b = dir.path().join("two/report.pdf");
        for p in [&a, &b] {
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(p, b"same").unwrap();
        }

        let report = remove(&[&a, &b], &trash).unwrap();
        assert_eq!(report.moved_count(), 2);
        assert_ne!(report.moved[0].staged, report.moved[1].staged);
        assert_eq!(fs::read_dir(&trash).unwrap().count(), 2);
    }

    #[test]
    fn usage_of_missing_dir_is_zero() {
        let dir = tempdir().unwrap();
        let usage = staging_usage(&dir.path().join("absent")).unwrap();
        assert_eq!(usage, StagingUsage::default());
    }

    #[test]
    fn usage_counts_top_level_entries() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("1_a"), vec![0u8; 10]).unwrap();
        fs::create_dir(dir.path().join("2_dir")).unwrap();
        fs::write(dir.path().join("2_dir/inner"), vec![0u8; 5]).unwrap();
        let usage = staging_usage(dir.path()).unwrap();
        assert_eq!(usage.entries, 2);
        assert_eq!(usage.bytes, 15);
    }
}
