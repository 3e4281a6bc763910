//! Parsing and validation of `viewcache.toml`, environment overrides, and
//! the host adapters that decide whether pre-caching runs and where.
//!
//! A host application picks one [`HostAdapter`] explicitly; the cache core
//! never inspects the host itself. [`host_from_config`] builds the adapter
//! named in the `[host]` section.

#![warn(missing_docs)]

pub mod env;
pub mod error;
pub mod host;
pub mod loader;
pub mod types;

pub use env::apply_env_overrides;
pub use error::ConfigError;
pub use host::{
    host_from_config, EnvironmentHost, HostAdapter, HostDecision, StaticHost, ViewSettingsHost,
};
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE, MAX_CONCURRENCY};
pub use types::*;
