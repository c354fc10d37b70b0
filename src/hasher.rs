//! Content digests for duplicate confirmation.
//!
//! Files up to [`LARGE_FILE_THRESHOLD`] are hashed in full. Larger files are
//! sampled: the first, middle and last [`SAMPLE_WINDOW`] bytes are hashed as
//! one buffer. Sampling bounds the I/O per file, but two large files that
//! share those three windows get the same digest even when they differ
//! somewhere else. Callers that need certainty for large files should raise
//! the threshold.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

pub const LARGE_FILE_THRESHOLD: u64 = 50 * 1024 * 1024;
pub const SAMPLE_WINDOW: u64 = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashStrategy {
    /// Files strictly larger than this are sampled instead of fully hashed.
    pub large_file_threshold: u64,
    /// Length of each of the three sampled windows.
    pub sample_window: u64,
}

impl Default for HashStrategy {
    fn default() -> Self {
        Self {
            large_file_threshold: LARGE_FILE_THRESHOLD,
            sample_window: SAMPLE_WINDOW,
        }
    }
}

impl HashStrategy {
    pub fn is_sampled(&self, size: u64) -> bool {
        size > self.large_file_threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest(blake3::Hash);

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl From<blake3::Hash> for Digest {
    fn from(hash: blake3::Hash) -> Self {
        Self(hash)
    }
}

/// Digest of the file at `path`, whose size was observed as `size`.
pub fn content_digest(path: &Path, size: u64, strategy: &HashStrategy) -> io::Result<Digest> {
    let digest = if strategy.is_sampled(size) {
        sampled_digest(path, size, strategy.sample_window)?
    } else {
        full_digest(path)?
    };
    debug!("Hash calculated for '{}': {}", path.display(), digest);
    Ok(digest)
}

fn full_digest(path: &Path) -> io::Result<Digest> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().into())
}

fn sampled_digest(path: &Path, size: u64, window: u64) -> io::Result<Digest> {
    let mut file = File::open(path)?;
    let len = window as usize;
    let mut buffer = vec![0u8; len * 3];

    // Windows overlap or run short on files under two windows long; the
    // unread tail of a window stays zeroed.
    let offsets = [0, size / 2, size.saturating_sub(window)];
    for (chunk, offset) in buffer.chunks_exact_mut(len).zip(offsets) {
        let wanted = window.min(size - offset) as usize;
        file.seek(SeekFrom::Start(offset))?;
        // A file that shrank since it was sized fails here.
        file.read_exact(&mut chunk[..wanted])?;
    }

    Ok(blake3::hash(&buffer).into())
}
