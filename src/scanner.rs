use std::path::{Path, PathBuf};

use indicatif::{HumanBytes, HumanCount, ProgressBar};
use log::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Result, SweepError};
use crate::signal::Cancellation;

/// Default zero-based depth limit of the duplicate scan.
pub const DEFAULT_MAX_DEPTH: usize = 4;
/// Files of this size or smaller are ignored by the duplicate scan.
pub const DEFAULT_MIN_SIZE: u64 = 1024;

/// A file that passed the size floor and may have duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Deepest directory level that is still listed (root is level 0).
    pub max_depth: usize,
    /// Only files strictly larger than this are collected.
    pub min_size: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            min_size: DEFAULT_MIN_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub dirs_visited: u64,
    pub files_seen: u64,
    /// Entries dropped because they could not be read.
    pub skipped: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub files: Vec<CandidateFile>,
    pub stats: ScanStats,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Walks `root` depth-first, calling `visit` with the path and size of every
/// regular file.
///
/// Directories at levels `0..=max_depth` are listed, siblings in file name
/// order. Symlinks are not followed. The root itself is never treated as
/// hidden, only what lies beneath it. Unreadable entries are counted in
/// [`ScanStats::skipped`] and the walk carries on.
pub fn walk_files<F>(
    root: &Path,
    max_depth: usize,
    skip_hidden: bool,
    cancel: &Cancellation,
    mut visit: F,
) -> Result<ScanStats>
where
    F: FnMut(&Path, u64),
{
    if !root.is_dir() {
        return Err(SweepError::RootUnavailable(root.to_path_buf()));
    }

    let mut stats = ScanStats::default();
    let walker = WalkDir::new(root)
        .max_depth(max_depth.saturating_add(1))
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !(skip_hidden && is_hidden(e)));

    for entry in walker {
        cancel.check()?;
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                stats.skipped += 1;
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            stats.dirs_visited += 1;
            continue;
        }
        if !file_type.is_file() {
            continue;
        }

        match entry.metadata() {
            Ok(metadata) => {
                stats.files_seen += 1;
                visit(entry.path(), metadata.len());
            }
            Err(e) => {
                debug!("Failed to read metadata for '{}': {}", entry.path().display(), e);
                stats.skipped += 1;
            }
        }
    }

    Ok(stats)
}

/// Collects every non-hidden file under `root` larger than
/// `options.min_size`, in traversal order.
pub fn scan(root: &Path, options: &ScanOptions, cancel: &Cancellation) -> Result<ScanOutcome> {
    info!("Scanning {}", root.display());

    let pb = ProgressBar::new_spinner();
    pb.set_message("Scanning files and directories...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let mut files = Vec::new();
    let mut total_size = 0u64;
    let result = walk_files(root, options.max_depth, true, cancel, |path, size| {
        pb.tick();
        if size > options.min_size {
            total_size += size;
            files.push(CandidateFile {
                path: path.to_path_buf(),
                size,
            });
        }
    });
    pb.finish_and_clear();
    let stats = result?;

    info!(
        "Found {} candidate files ({}) in {} directories, {} entries skipped",
        HumanCount(files.len() as u64),
        HumanBytes(total_size),
        HumanCount(stats.dirs_visited),
        stats.skipped
    );

    Ok(ScanOutcome { files, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(path: &Path, len: usize) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![b'x'; len]).unwrap();
    }

    #[test]
    fn size_floor_is_exclusive() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("exact.bin"), 1024);
        write(&dir.path().join("bigger.bin"), 1025);

        let outcome = scan(dir.path(), &ScanOptions::default(), &Cancellation::new()).unwrap();
        let names: Vec<_> = outcome
            .files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_owned())
            .collect();
        assert_eq!(names, vec!["bigger.bin"]);
        assert_eq!(outcome.stats.files_seen, 2);
    }

    #[test]
    fn hidden_entries_are_skipped() {
        let dir = tempdir().unwrap();
        write(&dir.path().join(".hidden.bin"), 2048);
        write(&dir.path().join(".git/objects/blob"), 2048);
        write(&dir.path().join("visible.bin"), 2048);

        let outcome = scan(dir.path(), &ScanOptions::default(), &Cancellation::new()).unwrap();
        assert_eq!(outcome.files.len(), 1);
        assert!(outcome.files[0].path.ends_with("visible.bin"));
    }

    #[test]
    fn depth_limit_stops_descent() {
        let dir = tempdir().unwrap();
        // Directories at levels 0..=2 are listed with max_depth = 2.
        write(&dir.path().join("a/b/at_two.bin"), 2048);
        write(&dir.path().join("a/b/c/at_three.bin"), 2048);

        let options = ScanOptions {
            max_depth: 2,
            ..ScanOptions::default()
        };
        let outcome = scan(dir.path(), &options, &Cancellation::new()).unwrap();
        assert_eq!(outcome.files.len(), 1);
        assert!(outcome.files[0].path.ends_with("a/b/at_two.bin"));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        write(&dir.path().join("a_first.bin"), 2048);
        write(&dir.path().join("locked/inside.bin"), 2048);
        write(&dir.path().join("z_last/after.bin"), 2048);
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users read through the mode bits; nothing to check then.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let outcome = scan(dir.path(), &ScanOptions::default(), &Cancellation::new());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        let outcome = outcome.unwrap();

        assert!(outcome.stats.skipped >= 1);
        let names: Vec<_> = outcome
            .files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_owned())
            .collect();
        assert_eq!(names, vec!["a_first.bin", "after.bin"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = scan(&missing, &ScanOptions::default(), &Cancellation::new()).unwrap_err();
        assert!(matches!(err, SweepError::RootUnavailable(p) if p == missing));
    }

    #[test]
    fn cancelled_scan_stops() {
        let dir = tempdir().unwrap();
        write(&dir.path().join("file.bin"), 2048);
        let cancel = Cancellation::new();
        cancel.cancel();
        let err = scan(dir.path(), &ScanOptions::default(), &cancel).unwrap_err();
        assert!(matches!(err, SweepError::Cancelled));
    }
}
