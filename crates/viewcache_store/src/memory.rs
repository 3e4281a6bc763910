//! Process-local store.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use viewcache_common::ContentHash;

use crate::error::StoreError;
use crate::store::ArtifactStore;

/// An in-memory [`ArtifactStore`].
///
/// Records live as long as the value does. Sharing one `MemoryStore` (behind
/// an `Arc`) between two engines simulates a persistent store surviving a
/// restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    hashes: DashMap<String, ContentHash>,
    artifacts: DashMap<ContentHash, Vec<u8>>,
    hash_writes: AtomicUsize,
    artifact_writes: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of hash records.
    pub fn hash_count(&self) -> usize {
        self.hashes.len()
    }

    /// Number of artifact records.
    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    /// The recorded hash for `path`, if any.
    pub fn hash_for(&self, path: &str) -> Option<ContentHash> {
        self.hashes.get(path).map(|h| *h)
    }

    /// A copy of the artifact stored under `hash`, if any.
    pub fn artifact_for(&self, hash: &ContentHash) -> Option<Vec<u8>> {
        self.artifacts.get(hash).map(|a| a.clone())
    }

    /// Removes an artifact record, as an external eviction would.
    pub fn remove_artifact(&self, hash: &ContentHash) -> bool {
        self.artifacts.remove(hash).is_some()
    }

    /// Total `set_hash` calls, including those made through `commit`.
    pub fn hash_writes(&self) -> usize {
        self.hash_writes.load(Ordering::Relaxed)
    }

    /// Total `set_artifact` calls, including those made through `commit`.
    pub fn artifact_writes(&self) -> usize {
        self.artifact_writes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_hash(&self, path: &str) -> Result<Option<ContentHash>, StoreError> {
        Ok(self.hash_for(path))
    }

    async fn set_hash(&self, path: &str, hash: &ContentHash) -> Result<(), StoreError> {
        self.hash_writes.fetch_add(1, Ordering::Relaxed);
        self.hashes.insert(path.to_string(), *hash);
        Ok(())
    }

    async fn get_artifact(&self, hash: &ContentHash) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.artifact_for(hash))
    }

    async fn set_artifact(&self, hash: &ContentHash, artifact: &[u8]) -> Result<(), StoreError> {
        self.artifact_writes.fetch_add(1, Ordering::Relaxed);
        self.artifacts.insert(*hash, artifact.to_vec());
        Ok(())
    }
}
