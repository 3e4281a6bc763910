//! Error types for resolving and pre-caching templates.

use std::path::PathBuf;

use viewcache_store::StoreError;
use viewcache_template::CompileError;

/// A single template could not be resolved. The store is never modified
/// when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The template file could not be read.
    #[error("failed to read template {path}: {source}")]
    FileRead {
        /// The template path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The compiler rejected the template.
    #[error("failed to compile {path}: {source}")]
    Compilation {
        /// The template path.
        path: PathBuf,
        /// The compiler's error.
        source: CompileError,
    },

    /// The compiled program could not be serialized for storage.
    #[error("failed to serialize compiled template {path}: {reason}")]
    Serialization {
        /// The template path.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },
}

/// A directory could not be listed; the walk skipped that subtree.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Listing the directory, or one of its entries, failed.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        /// The directory that could not be listed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Why one file ended up in the failure list of a pre-cache report.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// The file was not cached.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The file was compiled and is usable in this process, but its records
    /// could not be written to the store.
    #[error("compiled but not durably cached: {0}")]
    NotPersisted(#[source] StoreError),

    /// The task resolving the file panicked or was cancelled before it
    /// produced a result. Nothing was installed for the file.
    #[error("template task did not complete: {reason}")]
    TaskFailed {
        /// The runtime's description of the failure.
        reason: String,
    },
}

/// Misconfiguration detected before any scanning starts.
#[derive(Debug, thiserror::Error)]
pub enum PrecacheError {
    /// No root directories were given.
    #[error("no template root directories configured")]
    NoRoots,

    /// A root directory does not exist or is not a directory.
    #[error("template root {path} does not exist or is not a directory")]
    MissingRoot {
        /// The offending root.
        path: PathBuf,
    },

    /// The concurrency bound was zero or above what the runtime can track.
    #[error("concurrency must be between 1 and {max}, got {requested}")]
    InvalidConcurrency {
        /// The requested bound.
        requested: usize,
        /// The largest accepted bound.
        max: usize,
    },
}
