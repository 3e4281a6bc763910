//! Configuration types deserialized from `viewcache.toml`.

use serde::Deserialize;
use std::path::PathBuf;

/// The top-level configuration parsed from `viewcache.toml`.
///
/// Every section is optional; an empty file yields a usable configuration
/// with an in-memory store and no roots.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewCacheConfig {
    /// Scan and scheduling settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Artifact store backend selection.
    #[serde(default)]
    pub store: StoreConfig,
    /// Which host adapter decides whether to run.
    #[serde(default)]
    pub host: HostConfig,
}

/// The `[cache]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Master switch. When `false`, no host adapter can enable pre-caching.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Maximum number of templates resolved at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Template file extension, without the leading dot.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Directories to scan. May be left empty when the host adapter supplies
    /// a default.
    #[serde(default)]
    pub roots: Vec<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            concurrency: default_concurrency(),
            extension: default_extension(),
            roots: Vec::new(),
        }
    }
}

/// The `[store]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Which backend holds hash and artifact records.
    #[serde(default)]
    pub backend: StoreBackend,
    /// Cache directory for the `file` backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Connection URL for the `redis` backend.
    #[serde(default)]
    pub url: Option<String>,
    /// Prefix for hash-record keys in networked backends.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: None,
            url: None,
            key_prefix: default_key_prefix(),
        }
    }
}

/// Artifact store backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local; nothing survives a restart.
    #[default]
    Memory,
    /// A cache directory on local disk.
    File,
    /// A Redis server.
    Redis,
}

/// The `[host]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Adapter to use.
    #[serde(default)]
    pub kind: HostKind,
    /// View engine the host is configured with (`view-settings` hosts).
    #[serde(default)]
    pub view_engine: Option<String>,
    /// Whether the host has view caching turned on (`view-settings` hosts).
    /// Defaults to `cache.enabled`.
    #[serde(default)]
    pub view_cache: Option<bool>,
    /// Deployment environment name (`environment` hosts).
    #[serde(default)]
    pub environment: Option<String>,
    /// Pre-cache outside production (`environment` hosts).
    #[serde(default)]
    pub cache_override: bool,
}

/// Host adapter selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKind {
    /// Enabled flag and roots come straight from `[cache]`.
    #[default]
    Static,
    /// Gate on a view-cache setting and require a matching view engine.
    ViewSettings,
    /// Gate on the deployment environment.
    Environment,
}

fn default_enabled() -> bool {
    true
}

fn default_concurrency() -> usize {
    4
}

fn default_extension() -> String {
    "tmpl".to_string()
}

fn default_key_prefix() -> String {
    "views:".to_string()
}
