//! Networked store on Redis.
//!
//! Hash records live under `<prefix><path>` as hex strings, artifacts under
//! the bare hex content hash. `commit` writes both keys in one `MULTI/EXEC`
//! transaction.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use viewcache_common::ContentHash;

use crate::error::StoreError;
use crate::store::ArtifactStore;

/// Default prefix for hash-record keys.
pub const DEFAULT_KEY_PREFIX: &str = "views:";

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Backend {
            backend: "redis",
            reason: e.to_string(),
        }
    }
}

/// An [`ArtifactStore`] backed by a Redis server.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisStore {
    /// Connects to `url` (e.g. `redis://127.0.0.1/`).
    pub async fn connect(url: &str, key_prefix: impl Into<String>) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self {
            conn,
            key_prefix: key_prefix.into(),
        })
    }

    fn hash_key(&self, path: &str) -> String {
        format!("{}{path}", self.key_prefix)
    }
}

#[async_trait]
impl ArtifactStore for RedisStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get_hash(&self, path: &str) -> Result<Option<ContentHash>, StoreError> {
        let mut conn = self.conn.clone();
        let stored: Option<String> = conn.get(self.hash_key(path)).await?;
        Ok(stored.and_then(|hex| match hex.parse() {
            Ok(hash) => Some(hash),
            Err(e) => {
                tracing::warn!(path, error = %e, "ignoring malformed hash record");
                None
            }
        }))
    }

    async fn set_hash(&self, path: &str, hash: &ContentHash) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let () = conn.set(self.hash_key(path), hash.to_string()).await?;
        Ok(())
    }

    async fn get_artifact(&self, hash: &ContentHash) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();
        let artifact: Option<Vec<u8>> = conn.get(hash.to_string()).await?;
        Ok(artifact)
    }

    async fn set_artifact(&self, hash: &ContentHash, artifact: &[u8]) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let () = conn.set(hash.to_string(), artifact).await?;
        Ok(())
    }

    async fn commit(
        &self,
        path: &str,
        hash: &ContentHash,
        artifact: &[u8],
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let () = redis::pipe()
            .atomic()
            .set(self.hash_key(path), hash.to_string())
            .ignore()
            .set(hash.to_string(), artifact)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}
