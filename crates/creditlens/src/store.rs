//! Durable artifact store: a key-to-blob mapping on local disk.
//!
//! Blobs land at a path derived deterministically from their cache key, so
//! repeated writes of the same key overwrite rather than duplicate. Writes
//! go to a temporary sibling first and are renamed into place, so an
//! interrupted write never leaves a partial file visible at the key's path.
//!
//! No eviction: entries live until `clear` removes them. A bounded
//! implementation can be substituted behind this interface without touching
//! callers.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::request::CacheKey;
use crate::types::{CreditError, CreditResult};

/// One stored artifact, as reported by [`ArtifactStore::entries`].
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub name: String,
    pub bytes: u64,
}

/// Blob store rooted at a dedicated scratch directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open a store, creating the scratch directory if absent.
    pub fn open(root: impl Into<PathBuf>) -> CreditResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        tracing::debug!("artifact store opened at {}", root.display());
        Ok(Self { root })
    }

    /// Scratch directory this store owns.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic path for a key, whether or not it exists yet.
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    /// Whether a blob exists for this key.
    pub fn exists(&self, key: &CacheKey) -> bool {
        self.path_for(key).is_file()
    }

    /// Path to an existing blob.
    pub fn read(&self, key: &CacheKey) -> CreditResult<PathBuf> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Err(CreditError::NotFound(key.as_str().to_string()));
        }
        Ok(path)
    }

    /// Persist a fully-drained blob under this key.
    ///
    /// The bytes are written to `<key>.tmp`, flushed to disk, then renamed
    /// onto the final path. Re-writing an existing key is an idempotent
    /// overwrite.
    pub fn write(&self, key: &CacheKey, bytes: &[u8]) -> CreditResult<PathBuf> {
        let path = self.path_for(key);
        let tmp = self.root.join(format!("{}.tmp", key.as_str()));

        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        tracing::debug!("stored {} ({} bytes)", key, bytes.len());
        Ok(path)
    }

    /// List stored artifacts with their sizes. Leftover `.tmp` files from
    /// interrupted writes are not artifacts and are skipped.
    pub fn entries(&self) -> CreditResult<Vec<StoredArtifact>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            if !meta.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".tmp") {
                continue;
            }
            out.push(StoredArtifact {
                name,
                bytes: meta.len(),
            });
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    /// Delete every stored artifact, returning how many were removed.
    pub fn clear(&self) -> CreditResult<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.metadata()?.is_file() {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        tracing::info!("cleared {removed} artifacts from {}", self.root.display());
        Ok(removed)
    }
}
