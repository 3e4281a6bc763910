//! Content-addressed template pre-cache.
//!
//! The [`Engine`] resolves one template path: it fingerprints the file,
//! reuses the stored compiled artifact when the fingerprint matches the
//! stored hash record, and otherwise compiles and commits a fresh artifact.
//! Every resolved template lands in the caller-owned [`ReadyRegistry`].
//!
//! [`precache`] walks root directories with a [`TemplateWalker`] and feeds
//! matching files to the engine with bounded concurrency, collecting
//! per-file failures instead of aborting.

#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod registry;
pub mod scan;
pub mod scheduler;

pub use engine::{Engine, EngineStats, Outcome, Resolved};
pub use error::{FileError, PrecacheError, ResolveError, ScanError};
pub use registry::ReadyRegistry;
pub use scan::{DirectoryLister, FsLister, TemplateWalker};
pub use scheduler::{precache, CompiledHook, FileFailure, PrecacheOptions, PrecacheReport};
