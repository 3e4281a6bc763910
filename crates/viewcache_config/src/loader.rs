//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{StoreBackend, ViewCacheConfig};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "viewcache.toml";

/// Largest accepted `cache.concurrency`.
pub const MAX_CONCURRENCY: usize = 65_536;

/// Loads and validates `<dir>/viewcache.toml`.
///
/// A missing file is not an error: the defaults are returned instead, so an
/// application can pre-cache with nothing but environment overrides.
pub fn load_config(dir: &Path) -> Result<ViewCacheConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no configuration file, using defaults");
        return Ok(ViewCacheConfig::default());
    }
    load_config_file(&path)
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_file(path: &Path) -> Result<ViewCacheConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ViewCacheConfig, ConfigError> {
    let config: ViewCacheConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks value ranges and backend-specific required fields.
pub fn validate_config(config: &ViewCacheConfig) -> Result<(), ConfigError> {
    let concurrency = config.cache.concurrency;
    if concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "cache.concurrency must be at least 1".to_string(),
        ));
    }
    if concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::ValidationError(format!(
            "cache.concurrency {concurrency} exceeds the maximum of {MAX_CONCURRENCY}"
        )));
    }
    let ext = &config.cache.extension;
    if ext.is_empty() || ext.contains('.') || ext.contains('/') {
        return Err(ConfigError::ValidationError(format!(
            "cache.extension '{ext}' must be a bare suffix like \"tmpl\""
        )));
    }
    match config.store.backend {
        StoreBackend::Memory => {}
        StoreBackend::File if config.store.path.is_none() => {
            return Err(ConfigError::MissingField("store.path".to_string()));
        }
        StoreBackend::Redis if config.store.url.is_none() => {
            return Err(ConfigError::MissingField("store.url".to_string()));
        }
        StoreBackend::File | StoreBackend::Redis => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HostKind;

    #[test]
    fn empty_config_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.concurrency, 4);
        assert_eq!(config.cache.extension, "tmpl");
        assert!(config.cache.roots.is_empty());
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.key_prefix, "views:");
        assert_eq!(config.host.kind, HostKind::Static);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[cache]
enabled = false
concurrency = 8
extension = "pug"
roots = ["views", "emails"]

[store]
backend = "redis"
url = "redis://127.0.0.1/"
key_prefix = "app:views:"

[host]
kind = "view-settings"
view_engine = "pug"
view_cache = true
"#;
        let config = load_config_from_str(toml).unwrap();
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.concurrency, 8);
        assert_eq!(config.cache.extension, "pug");
        assert_eq!(config.cache.roots.len(), 2);
        assert_eq!(config.store.backend, StoreBackend::Redis);
        assert_eq!(config.store.url.as_deref(), Some("redis://127.0.0.1/"));
        assert_eq!(config.store.key_prefix, "app:views:");
        assert_eq!(config.host.kind, HostKind::ViewSettings);
        assert_eq!(config.host.view_engine.as_deref(), Some("pug"));
        assert_eq!(config.host.view_cache, Some(true));
    }

    #[test]
    fn zero_concurrency_rejected() {
        let err = load_config_from_str("[cache]\nconcurrency = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn oversized_concurrency_rejected() {
        let at_limit = format!("[cache]\nconcurrency = {MAX_CONCURRENCY}\n");
        assert_eq!(load_config_from_str(&at_limit).unwrap().cache.concurrency, MAX_CONCURRENCY);

        let over = format!("[cache]\nconcurrency = {}\n", MAX_CONCURRENCY + 1);
        let err = load_config_from_str(&over).unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum"));
    }

    #[test]
    fn dotted_extension_rejected() {
        let err = load_config_from_str("[cache]\nextension = \".tmpl\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn file_backend_requires_path() {
        let err = load_config_from_str("[store]\nbackend = \"file\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "store.path"));
    }

    #[test]
    fn redis_backend_requires_url() {
        let err = load_config_from_str("[store]\nbackend = \"redis\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "store.url"));
    }

    #[test]
    fn unknown_field_rejected() {
        let err = load_config_from_str("[cache]\nconcurency = 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.cache.concurrency, 4);
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[store]\nbackend = \"file\"\npath = \".viewcache\"\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.store.backend, StoreBackend::File);
    }

    #[test]
    fn io_error_from_nonexistent_file() {
        let err = load_config_file(Path::new("/nonexistent/dir/viewcache.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
