//! Shared wiring for subcommands: configuration, store and engine.

use std::sync::Arc;

use viewcache_cache::{Engine, ReadyRegistry};
use viewcache_config::{StoreBackend, StoreConfig, ViewCacheConfig};
use viewcache_store::{ArtifactStore, FileStore, MemoryStore};
use viewcache_template::PlaceholderCompiler;

use crate::GlobalArgs;

/// Loads `--config` or `./viewcache.toml` and layers `VIEWCACHE_*` variables
/// on top.
pub fn load_config(global: &GlobalArgs) -> Result<ViewCacheConfig, Box<dyn std::error::Error>> {
    let mut config = match &global.config {
        Some(path) => viewcache_config::load_config_file(path)?,
        None => viewcache_config::load_config(&std::env::current_dir()?)?,
    };
    viewcache_config::apply_env_overrides(&mut config, std::env::vars())?;
    Ok(config)
}

/// Opens the configured artifact store.
pub async fn open_store(
    config: &StoreConfig,
) -> Result<Arc<dyn ArtifactStore>, Box<dyn std::error::Error>> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::File => {
            let path = config.path.as_deref().ok_or("store.path is required for the file backend")?;
            Ok(Arc::new(FileStore::new(path)))
        }
        StoreBackend::Redis => open_redis(config).await,
    }
}

#[cfg(feature = "redis")]
async fn open_redis(
    config: &StoreConfig,
) -> Result<Arc<dyn ArtifactStore>, Box<dyn std::error::Error>> {
    let url = config.url.as_deref().ok_or("store.url is required for the redis backend")?;
    let store = viewcache_store::RedisStore::connect(url, config.key_prefix.clone()).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "redis"))]
async fn open_redis(
    _config: &StoreConfig,
) -> Result<Arc<dyn ArtifactStore>, Box<dyn std::error::Error>> {
    Err("this build of viewcache has no redis support; rebuild with `--features redis`".into())
}

/// Builds an engine with the built-in compiler and an empty registry.
pub async fn build_engine(config: &ViewCacheConfig) -> Result<Arc<Engine>, Box<dyn std::error::Error>> {
    let store = open_store(&config.store).await?;
    tracing::debug!(store = store.name(), "opened artifact store");
    Ok(Arc::new(Engine::new(
        store,
        Arc::new(PlaceholderCompiler::new()),
        Arc::new(ReadyRegistry::new()),
    )))
}
