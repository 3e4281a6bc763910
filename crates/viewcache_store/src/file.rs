//! Directory-backed store that persists across restarts.
//!
//! Layout under the store root:
//!
//! ```text
//! paths/<xxh3(path)>.json     { "path": "...", "content_hash": ... }
//! artifacts/<hash>.art        sealed artifact bytes
//! ```
//!
//! Every write goes to a uniquely named temporary file in the same directory
//! and is renamed into place, so readers never observe a torn record.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use viewcache_common::ContentHash;

use crate::error::StoreError;
use crate::store::ArtifactStore;

const PATHS_SUBDIR: &str = "paths";
const ARTIFACTS_SUBDIR: &str = "artifacts";
const ARTIFACT_EXT: &str = "art";

/// On-disk hash record. The original path is kept so a file-name collision
/// between two paths reads as a miss instead of a wrong hit.
#[derive(Debug, Serialize, Deserialize)]
struct HashRecord {
    path: String,
    content_hash: ContentHash,
}

/// An [`ArtifactStore`] rooted at a cache directory.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    tmp_counter: AtomicU64,
}

impl FileStore {
    /// Creates a store rooted at `root`. Directories are created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tmp_counter: AtomicU64::new(0),
        }
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the hash record for `path`.
    pub fn hash_record_path(&self, path: &str) -> PathBuf {
        self.root
            .join(PATHS_SUBDIR)
            .join(format!("{}.json", ContentHash::of(path.as_bytes())))
    }

    /// Location of the artifact for `hash`.
    pub fn artifact_path(&self, hash: &ContentHash) -> PathBuf {
        self.root
            .join(ARTIFACTS_SUBDIR)
            .join(format!("{hash}.{ARTIFACT_EXT}"))
    }

    async fn write_atomic(&self, dest: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let dir = dest.parent().unwrap_or(&self.root);
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| io_err(dir, e))?;

        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let tmp = dest.with_extension(format!("{}.{n}.tmp", std::process::id()));
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, dest).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_err(dest, e));
        }
        Ok(())
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(path, e)),
    }
}

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[async_trait]
impl ArtifactStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn get_hash(&self, path: &str) -> Result<Option<ContentHash>, StoreError> {
        let record_path = self.hash_record_path(path);
        let Some(raw) = read_optional(&record_path).await? else {
            return Ok(None);
        };
        match serde_json::from_slice::<HashRecord>(&raw) {
            Ok(record) if record.path == path => Ok(Some(record.content_hash)),
            Ok(record) => {
                tracing::warn!(
                    wanted = path,
                    found = %record.path,
                    "hash record belongs to a different path"
                );
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(record = %record_path.display(), error = %e, "unreadable hash record");
                Ok(None)
            }
        }
    }

    async fn set_hash(&self, path: &str, hash: &ContentHash) -> Result<(), StoreError> {
        let record = HashRecord {
            path: path.to_string(),
            content_hash: *hash,
        };
        let json = serde_json::to_vec(&record).map_err(|e| StoreError::Serialization {
            reason: e.to_string(),
        })?;
        self.write_atomic(&self.hash_record_path(path), &json).await
    }

    async fn get_artifact(&self, hash: &ContentHash) -> Result<Option<Vec<u8>>, StoreError> {
        read_optional(&self.artifact_path(hash)).await
    }

    async fn set_artifact(&self, hash: &ContentHash, artifact: &[u8]) -> Result<(), StoreError> {
        self.write_atomic(&self.artifact_path(hash), artifact).await
    }
}
