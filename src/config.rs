use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::duplicates::KeepPolicy;
use crate::error::{Result, SweepError};
use crate::hasher::HashStrategy;
use crate::large_files::LargeFileOptions;
use crate::scanner::{DEFAULT_MAX_DEPTH, DEFAULT_MIN_SIZE, ScanOptions};

/// Empty when the user has no home directory; [`Config::load`] refuses an
/// empty trash dir, so nothing ends up relative to the working directory.
fn home_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

fn home_join(sub: &str) -> PathBuf {
    home_dir().map(|home| home.join(sub)).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    pub max_depth: usize,
    pub min_size: u64,
    /// Scanned when a request names no root.
    pub default_root: PathBuf,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            min_size: DEFAULT_MIN_SIZE,
            default_root: home_join("Downloads"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrashSection {
    pub dir: PathBuf,
}

impl Default for TrashSection {
    fn default() -> Self {
        Self {
            dir: home_dir()
                .map(|home| {
                    home.join(".Trash")
                        .join(format!("{}_Duplicates", env!("CARGO_PKG_NAME")))
                })
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LargeFilesSection {
    #[serde(flatten)]
    pub options: LargeFileOptions,
    pub roots: Vec<PathBuf>,
}

impl Default for LargeFilesSection {
    fn default() -> Self {
        Self {
            options: LargeFileOptions::default(),
            roots: ["Downloads", "Desktop", "Documents", "Movies"]
                .into_iter()
                .map(home_join)
                .filter(|root| !root.as_os_str().is_empty())
                .collect(),
        }
    }
}

/// Settings read from `sweep-dups.toml`. Every key is optional.
///
/// ```toml
/// keep = "oldest"
///
/// [scan]
/// max_depth = 4
/// min_size = 1024
///
/// [hashing]
/// large_file_threshold = 52428800
///
/// [trash]
/// dir = "/Users/me/.Trash/dupes"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub keep: KeepPolicy,
    pub scan: ScanSection,
    pub hashing: HashStrategy,
    pub trash: TrashSection,
    pub large_files: LargeFilesSection,
}

impl Config {
    /// Loads `explicit` if given, else `sweep-dups.toml` from the current
    /// directory if it exists, else the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let local = std::env::current_dir()?
                    .join(format!("{}.toml", env!("CARGO_PKG_NAME")));
                if !local.is_file() {
                    debug!("No config file found, using defaults");
                    return Self::default().validate(&local);
                }
                local
            }
        };

        let text = fs::read_to_string(&path).map_err(|e| SweepError::Config {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml(&text, &path)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str, origin: &Path) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SweepError::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate(origin)
    }

    /// Rejects a trash dir that would resolve against the working directory.
    fn validate(self, origin: &Path) -> Result<Self> {
        let message = if self.trash.dir.as_os_str().is_empty() {
            "no home directory found; set [trash] dir"
        } else if !self.trash.dir.is_absolute() {
            "[trash] dir must be an absolute path"
        } else {
            return Ok(self);
        };
        Err(SweepError::Config {
            path: origin.to_path_buf(),
            message: message.to_string(),
        })
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            max_depth: self.scan.max_depth,
            min_size: self.scan.min_size,
        }
    }
}
