//! Dump storage for oversized context values
//!
//! A dump is written to `dump/<crc32>.htm` in a [`BlobStore`] and referenced
//! from the log line by the token `dump/<crc32>`. Identical content always
//! lands on the same path. Dumps use `.htm` so HTML error traces open
//! directly in a browser; plain text shares the extension.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{LoggerError, Result};
use super::metrics::LoggerMetrics;

pub const DUMP_DIR: &str = "dump";
pub const DUMP_EXTENSION: &str = "htm";

/// Destination for dump files
pub trait BlobStore: Send + Sync {
    /// Write `content` at `path`, replacing anything already there
    fn put(&self, path: &str, content: &[u8]) -> Result<()>;
}

/// Blob store rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, path: &str, content: &[u8]) -> Result<()> {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "creating dump directory",
                    format!("cannot create '{}'", parent.display()),
                    e,
                )
            })?;
        }
        fs::write(&full_path, content)
            .map_err(|e| LoggerError::blob_store(full_path.display().to_string(), e.to_string()))
    }
}

/// In-memory blob store, mainly for tests
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.read().get(path).cloned()
    }

    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path)
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.blobs.read().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.blobs.read().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, path: &str, content: &[u8]) -> Result<()> {
        self.blobs.write().insert(path.to_string(), content.to_vec());
        Ok(())
    }
}

/// CRC-32 (IEEE) of the content bytes
pub fn checksum(content: &str) -> u32 {
    let mut crc = flate2::Crc::new();
    crc.update(content.as_bytes());
    crc.sum()
}

/// Token referencing the dump of `content`
pub fn dump_token(content: &str) -> String {
    format!("{}/{}", DUMP_DIR, checksum(content))
}

/// Blob store path for a dump token
pub fn dump_path(token: &str) -> String {
    format!("{}.{}", token, DUMP_EXTENSION)
}

/// Whether `value` has the shape `dump/<digits>`
pub fn is_dump_token(value: &str) -> bool {
    value
        .strip_prefix(DUMP_DIR)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Writes oversized values to a blob store and hands back reference tokens
#[derive(Clone)]
pub struct DumpStore {
    store: Arc<dyn BlobStore>,
    metrics: Arc<LoggerMetrics>,
}

impl DumpStore {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self::with_metrics(store, Arc::new(LoggerMetrics::new()))
    }

    pub fn with_metrics(store: Arc<dyn BlobStore>, metrics: Arc<LoggerMetrics>) -> Self {
        Self { store, metrics }
    }

    /// Store `content` and return its token
    ///
    /// The token is returned even when the write fails; the failure is
    /// reported on stderr and counted in the metrics.
    pub fn dump(&self, content: &str) -> String {
        let token = dump_token(content);
        let path = dump_path(&token);

        let put_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.store.put(&path, content.as_bytes())
        }));

        match put_result {
            Ok(Ok(())) => {
                self.metrics.record_dump_written();
            }
            Ok(Err(e)) => {
                self.metrics.record_dump_failure();
                eprintln!("[LOGGER ERROR] Failed to write dump '{}': {}", path, e);
            }
            Err(_) => {
                self.metrics.record_dump_failure();
                eprintln!(
                    "[LOGGER CRITICAL] Blob store panicked while writing dump '{}'",
                    path
                );
            }
        }

        token
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }
}

impl std::fmt::Debug for DumpStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumpStore").finish_non_exhaustive()
    }
}
