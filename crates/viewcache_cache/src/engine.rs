//! The compilation cache engine.
//!
//! For one template path the engine runs a strict chain: read, fingerprint,
//! look up the stored hash, fetch the artifact only if the hash matches, and
//! compile only if any of those steps came up empty. Store failures on the
//! read side degrade to a miss. A failed commit after a successful compile
//! still installs the template and reports it as not persisted.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use viewcache_common::ContentHash;
use viewcache_store::{envelope, ArtifactStore, StoreError};
use viewcache_template::{CompiledTemplate, TemplateCompiler};

use crate::error::ResolveError;
use crate::registry::ReadyRegistry;

/// Producer tag written into every artifact header.
const PRODUCER: &str = concat!("viewcache/", env!("CARGO_PKG_VERSION"));

/// How a resolved template was obtained.
#[derive(Debug)]
pub enum Outcome {
    /// The stored artifact was valid and reused; nothing was compiled.
    Reused,
    /// The template was compiled and both store records were written.
    Compiled,
    /// The template was compiled and installed, but committing it to the
    /// store failed. The next run will compile it again.
    CompiledUnpersisted(StoreError),
}

/// A successfully resolved template.
#[derive(Debug)]
pub struct Resolved {
    /// The installed template.
    pub template: Arc<CompiledTemplate>,
    /// How it was obtained.
    pub outcome: Outcome,
}

/// Snapshot of engine counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Resolutions served from a stored artifact.
    pub reused: usize,
    /// Resolutions that invoked the compiler successfully.
    pub compiled: usize,
    /// Resolutions that returned an error.
    pub failed: usize,
}

#[derive(Debug, Default)]
struct Counters {
    reused: AtomicUsize,
    compiled: AtomicUsize,
    failed: AtomicUsize,
}

/// Resolves template paths to compiled templates through an artifact store.
pub struct Engine {
    store: Arc<dyn ArtifactStore>,
    compiler: Arc<dyn TemplateCompiler>,
    registry: Arc<ReadyRegistry>,
    counters: Counters,
}

impl Engine {
    /// Creates an engine that installs resolved templates into `registry`.
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        compiler: Arc<dyn TemplateCompiler>,
        registry: Arc<ReadyRegistry>,
    ) -> Self {
        Self {
            store,
            compiler,
            registry,
            counters: Counters::default(),
        }
    }

    /// The registry this engine installs into.
    pub fn registry(&self) -> &Arc<ReadyRegistry> {
        &self.registry
    }

    /// Current counter values.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            reused: self.counters.reused.load(Ordering::Relaxed),
            compiled: self.counters.compiled.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Resolves `path` into the registry, reusing a stored artifact when the
    /// file's content is unchanged.
    pub async fn resolve(&self, path: &Path) -> Result<Resolved, ResolveError> {
        let result = self.resolve_inner(path).await;
        let counter = match &result {
            Ok(Resolved {
                outcome: Outcome::Reused,
                ..
            }) => &self.counters.reused,
            Ok(_) => &self.counters.compiled,
            Err(_) => &self.counters.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        result
    }

    async fn resolve_inner(&self, path: &Path) -> Result<Resolved, ResolveError> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|source| ResolveError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
        let hash = ContentHash::of(&content);
        let key = path.to_string_lossy();
        tracing::debug!(path = %path.display(), %hash, "fingerprinted template");

        if let Some(template) = self.load_cached(&key, &hash).await {
            tracing::debug!(path = %path.display(), "re-using cached artifact since content is unmodified");
            let template = Arc::new(template);
            self.registry.insert(path, Arc::clone(&template));
            return Ok(Resolved {
                template,
                outcome: Outcome::Reused,
            });
        }

        tracing::debug!(path = %path.display(), "compiling template");
        let source = String::from_utf8_lossy(&content);
        let template = self
            .compiler
            .compile(&source, path)
            .map_err(|source| ResolveError::Compilation {
                path: path.to_path_buf(),
                source,
            })?;
        let sealed = self.seal(path, &template)?;

        let outcome = match self.store.commit(&key, &hash, &sealed).await {
            Ok(()) => Outcome::Compiled,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    store = self.store.name(),
                    error = %e,
                    "compiled template could not be stored"
                );
                Outcome::CompiledUnpersisted(e)
            }
        };

        let template = Arc::new(template);
        self.registry.insert(path, Arc::clone(&template));
        Ok(Resolved { template, outcome })
    }

    /// Returns the stored template for `key` if its hash record equals `hash`
    /// and the artifact is present and intact. Every failure is a miss.
    async fn load_cached(&self, key: &str, hash: &ContentHash) -> Option<CompiledTemplate> {
        let stored = match self.store.get_hash(key).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(path = key, store = self.store.name(), error = %e, "hash lookup failed, treating as miss");
                return None;
            }
        };
        match stored {
            None => {
                tracing::debug!(path = key, "no hash record");
                return None;
            }
            Some(stored) if stored != *hash => {
                tracing::debug!(path = key, %stored, current = %hash, "hash changed, recompiling");
                return None;
            }
            Some(_) => {}
        }

        let raw = match self.store.get_artifact(hash).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(path = key, %hash, "hash record existed but its artifact was missing");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = key, store = self.store.name(), error = %e, "artifact lookup failed, treating as miss");
                return None;
            }
        };

        let program = match envelope::open(&raw) {
            Ok(payload) => CompiledTemplate::from_bytes(payload).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match program {
            Ok(template) => Some(template),
            Err(reason) => {
                tracing::warn!(path = key, %hash, %reason, "discarding unreadable artifact");
                None
            }
        }
    }

    fn seal(&self, path: &Path, template: &CompiledTemplate) -> Result<Vec<u8>, ResolveError> {
        let serialization = |reason: String| ResolveError::Serialization {
            path: path.to_path_buf(),
            reason,
        };
        let payload = template.to_bytes().map_err(|e| serialization(e.to_string()))?;
        envelope::seal(&payload, PRODUCER).map_err(|e| serialization(e.to_string()))
    }
}
