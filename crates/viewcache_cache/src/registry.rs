//! The in-process registry of templates ready to render.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use viewcache_template::CompiledTemplate;

/// Executable templates keyed by path, for the lifetime of one process run.
///
/// Owned by the caller and shared with the engine through an `Arc`. Safe for
/// concurrent writers. Entries are only ever replaced, never evicted.
#[derive(Debug, Default)]
pub struct ReadyRegistry {
    templates: DashMap<PathBuf, Arc<CompiledTemplate>>,
}

impl ReadyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `template` under `path`, returning the template it replaced.
    pub fn insert(
        &self,
        path: impl Into<PathBuf>,
        template: Arc<CompiledTemplate>,
    ) -> Option<Arc<CompiledTemplate>> {
        self.templates.insert(path.into(), template)
    }

    /// Returns the template installed under `path`.
    pub fn get(&self, path: &Path) -> Option<Arc<CompiledTemplate>> {
        self.templates.get(path).map(|t| Arc::clone(&t))
    }

    /// Whether a template is installed under `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.templates.contains_key(path)
    }

    /// Number of installed templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// All installed paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.templates.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }

    /// Renders the template at `path` with `ctx`, if it is installed.
    pub fn render(&self, path: &Path, ctx: &serde_json::Value) -> Option<String> {
        self.get(path).map(|t| t.render(ctx))
    }
}
