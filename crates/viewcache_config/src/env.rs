//! Environment variable overrides layered on top of `viewcache.toml`.
//!
//! | Variable | Field |
//! |---|---|
//! | `VIEWCACHE_ENABLED` | `cache.enabled` |
//! | `VIEWCACHE_CONCURRENCY` | `cache.concurrency` |
//! | `VIEWCACHE_ROOTS` | `cache.roots` (platform path-list separator) |
//! | `VIEWCACHE_STORE_URL` | `store.url` |
//! | `VIEWCACHE_ENVIRONMENT` | `host.environment` |

use std::ffi::OsStr;

use crate::error::ConfigError;
use crate::loader::validate_config;
use crate::types::ViewCacheConfig;

/// Applies recognized `VIEWCACHE_*` variables from `vars` and revalidates.
///
/// Pass `std::env::vars()` in production; tests pass a literal list.
/// Unrecognized variables are ignored.
pub fn apply_env_overrides<I, K, V>(config: &mut ViewCacheConfig, vars: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    for (key, value) in vars {
        let (key, value) = (key.as_ref(), value.as_ref().trim());
        match key {
            "VIEWCACHE_ENABLED" => config.cache.enabled = parse_bool(key, value)?,
            "VIEWCACHE_CONCURRENCY" => {
                config.cache.concurrency = value.parse().map_err(|_| {
                    ConfigError::ValidationError(format!("{key}='{value}' is not a positive integer"))
                })?;
            }
            "VIEWCACHE_ROOTS" => {
                config.cache.roots = std::env::split_paths(OsStr::new(value))
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect();
            }
            "VIEWCACHE_STORE_URL" => config.store.url = Some(value.to_string()),
            "VIEWCACHE_ENVIRONMENT" => config.host.environment = Some(value.to_string()),
            _ => continue,
        }
        tracing::debug!(key, value, "applied environment override");
    }
    validate_config(config)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::ValidationError(format!(
            "{key}='{value}' is not a boolean"
        ))),
    }
}
