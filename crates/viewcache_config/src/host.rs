//! Host adapters: whether pre-caching should run, and over which roots.
//!
//! Each hosting style gets its own adapter, chosen explicitly by the caller.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::types::{HostKind, ViewCacheConfig};

/// Default views directory for [`ViewSettingsHost`] when none is configured.
pub const DEFAULT_VIEWS_DIR: &str = "views";

/// The engine name the built-in compiler answers to.
pub const DEFAULT_ENGINE: &str = "tmpl";

/// What a host adapter decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDecision {
    /// Whether pre-caching should run at all.
    pub enabled: bool,
    /// Root directories to scan, in order.
    pub roots: Vec<PathBuf>,
}

impl HostDecision {
    /// A decision not to run.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            roots: Vec::new(),
        }
    }
}

/// Inspects a hosting application's settings and decides whether to pre-cache.
pub trait HostAdapter: Send + Sync {
    /// Returns the decision, or a misconfiguration that must stop startup.
    fn decision(&self) -> Result<HostDecision, ConfigError>;
}

/// Uses the given flag and roots as-is.
#[derive(Debug, Clone)]
pub struct StaticHost {
    /// Whether to run.
    pub enabled: bool,
    /// Roots to scan.
    pub roots: Vec<PathBuf>,
}

impl HostAdapter for StaticHost {
    fn decision(&self) -> Result<HostDecision, ConfigError> {
        if !self.enabled {
            return Ok(HostDecision::disabled());
        }
        if self.roots.is_empty() {
            return Err(ConfigError::MissingField("cache.roots".to_string()));
        }
        Ok(HostDecision {
            enabled: true,
            roots: self.roots.clone(),
        })
    }
}

/// A host that exposes a view-cache switch and a view-engine name.
///
/// Runs only when view caching is on; refuses to start when the host renders
/// with a different engine. Falls back to `views/` when no directory is set.
#[derive(Debug, Clone)]
pub struct ViewSettingsHost {
    /// The host's view-cache switch.
    pub view_cache: bool,
    /// The host's configured view engine.
    pub view_engine: String,
    /// Engine name this cache compiles for.
    pub expected_engine: String,
    /// Views directories, if configured.
    pub views: Vec<PathBuf>,
}

impl HostAdapter for ViewSettingsHost {
    fn decision(&self) -> Result<HostDecision, ConfigError> {
        if !self.view_cache {
            tracing::debug!("view cache was not enabled");
            return Ok(HostDecision::disabled());
        }
        if self.view_engine != self.expected_engine {
            return Err(ConfigError::EngineMismatch {
                expected: self.expected_engine.clone(),
                found: self.view_engine.clone(),
            });
        }
        let roots = if self.views.is_empty() {
            vec![PathBuf::from(DEFAULT_VIEWS_DIR)]
        } else {
            self.views.clone()
        };
        Ok(HostDecision {
            enabled: true,
            roots,
        })
    }
}

/// A host gated on its deployment environment.
///
/// Requires an explicit views directory. Runs in `production`, or anywhere
/// when `cache_override` is set.
#[derive(Debug, Clone)]
pub struct EnvironmentHost {
    /// Deployment environment name.
    pub environment: String,
    /// Pre-cache even outside production.
    pub cache_override: bool,
    /// Views directories.
    pub views: Vec<PathBuf>,
}

impl HostAdapter for EnvironmentHost {
    fn decision(&self) -> Result<HostDecision, ConfigError> {
        if self.views.is_empty() {
            return Err(ConfigError::MissingField("cache.roots".to_string()));
        }
        if self.environment != "production" && !self.cache_override {
            tracing::debug!(environment = %self.environment, "not production and no cache override");
            return Ok(HostDecision::disabled());
        }
        Ok(HostDecision {
            enabled: true,
            roots: self.views.clone(),
        })
    }
}

/// Builds the adapter named by `[host] kind`.
///
/// `cache.enabled = false` short-circuits every adapter to a disabled decision.
pub fn host_from_config(config: &ViewCacheConfig) -> Box<dyn HostAdapter> {
    let roots = config.cache.roots.clone();
    if !config.cache.enabled {
        return Box::new(StaticHost {
            enabled: false,
            roots,
        });
    }
    match config.host.kind {
        HostKind::Static => Box::new(StaticHost {
            enabled: true,
            roots,
        }),
        HostKind::ViewSettings => Box::new(ViewSettingsHost {
            view_cache: config.host.view_cache.unwrap_or(config.cache.enabled),
            view_engine: config
                .host
                .view_engine
                .clone()
                .unwrap_or_else(|| DEFAULT_ENGINE.to_string()),
            expected_engine: DEFAULT_ENGINE.to_string(),
            views: roots,
        }),
        HostKind::Environment => Box::new(EnvironmentHost {
            environment: config
                .host
                .environment
                .clone()
                .unwrap_or_else(|| "development".to_string()),
            cache_override: config.host.cache_override,
            views: roots,
        }),
    }
}
