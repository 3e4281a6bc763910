//! The storage seam used by the compilation cache.

use async_trait::async_trait;
use viewcache_common::ContentHash;

use crate::error::StoreError;

/// Key-value persistence for hash records and artifact records.
///
/// The two maps are independent: `path -> hash` records which content a path
/// was last compiled from, `hash -> artifact` holds the sealed compiled
/// template for that content. Backends need not write both maps atomically;
/// the cache treats a hash record whose artifact is missing as a miss.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Short backend name for log output.
    fn name(&self) -> &'static str;

    /// Returns the last recorded content hash for `path`.
    async fn get_hash(&self, path: &str) -> Result<Option<ContentHash>, StoreError>;

    /// Records `hash` as the current content hash for `path`.
    async fn set_hash(&self, path: &str, hash: &ContentHash) -> Result<(), StoreError>;

    /// Returns the sealed artifact stored under `hash`.
    async fn get_artifact(&self, hash: &ContentHash) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stores a sealed artifact under `hash`. Writing the same hash twice
    /// writes identical bytes.
    async fn set_artifact(&self, hash: &ContentHash, artifact: &[u8]) -> Result<(), StoreError>;

    /// Writes both records for a fresh compilation.
    ///
    /// The default writes the hash record first and the artifact second, so
    /// an interruption between the two leaves a hash whose artifact is
    /// missing: a detectable miss. Backends with multi-key transactions
    /// override this with one atomic write.
    async fn commit(
        &self,
        path: &str,
        hash: &ContentHash,
        artifact: &[u8],
    ) -> Result<(), StoreError> {
        self.set_hash(path, hash).await?;
        self.set_artifact(hash, artifact).await
    }
}
