//! Persistence for compiled template artifacts.
//!
//! An [`ArtifactStore`] holds two independent maps: the last-seen content hash
//! per template path, and the sealed compiled artifact per content hash.
//! Backends:
//!
//! - [`MemoryStore`]: process-local, for tests and single-process use
//! - [`FileStore`]: a cache directory that survives restarts
//! - `RedisStore` (feature `redis`): shared across processes and hosts
//!
//! Artifacts are wrapped in a checksummed envelope (see [`envelope`]) so a
//! damaged or foreign record is detected and treated as a miss.

#![warn(missing_docs)]

pub mod envelope;
pub mod error;
pub mod file;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_store;
pub mod store;

pub use envelope::{open, seal, ArtifactHeader};
pub use error::{EnvelopeError, StoreError};
pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;
pub use store::ArtifactStore;
