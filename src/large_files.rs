use std::cmp::Reverse;
use std::path::{Path, PathBuf};

use indicatif::HumanBytes;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};
use crate::scanner::walk_files;
use crate::signal::Cancellation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Video,
    Image,
    Archive,
    Other,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mp4" | "mov" | "mkv" => Self::Video,
            "jpg" | "png" | "heic" => Self::Image,
            "zip" | "dmg" | "pkg" | "iso" => Self::Archive,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LargeFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub kind: FileKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LargeFileOptions {
    /// Only files strictly larger than this are reported.
    pub threshold: u64,
    pub max_depth: usize,
    /// Maximum number of files returned.
    pub limit: usize,
}

impl LargeFileOptions {
    /// Sets the threshold in MiB, saturating on absurd values.
    pub fn with_threshold_mb(mut self, mb: u64) -> Self {
        self.threshold = mb.saturating_mul(1024 * 1024);
        self
    }
}

impl Default for LargeFileOptions {
    fn default() -> Self {
        Self {
            threshold: 50 * 1024 * 1024,
            max_depth: 3,
            limit: 50,
        }
    }
}

/// The biggest files under `roots`, largest first.
///
/// Roots that don't exist are skipped. Hidden files are included, unlike
/// in the duplicate scan.
pub fn find_large_files<P: AsRef<Path>>(
    roots: &[P],
    options: &LargeFileOptions,
    cancel: &Cancellation,
) -> Result<Vec<LargeFile>> {
    let mut files = Vec::new();

    for root in roots {
        let root = root.as_ref();
        let walked = walk_files(root, options.max_depth, false, cancel, |path, size| {
            if size > options.threshold {
                files.push(LargeFile {
                    path: path.to_path_buf(),
                    name: path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    size,
                    kind: FileKind::from_path(path),
                });
            }
        });
        match walked {
            Ok(_) => {}
            Err(SweepError::RootUnavailable(path)) => {
                warn!("Skipping missing directory '{}'", path.display());
            }
            Err(e) => return Err(e),
        }
    }

    // Stable sort: equal sizes stay in traversal order.
    files.sort_by_key(|f| Reverse(f.size));
    files.truncate(options.limit);

    info!(
        "Found {} files larger than {}",
        files.len(),
        HumanBytes(options.threshold)
    );
    Ok(files)
}
