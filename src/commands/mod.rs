pub mod browse;
pub mod cache;
pub mod search;
pub mod show;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::catalog::{CatalogClient, ReqwestTransport};
use crate::config::Config;

/// Build a catalog client from config, attaching the response cache unless disabled
pub fn build_client(config: &Config, no_cache: bool) -> Result<CatalogClient> {
    let transport = ReqwestTransport::new(&config.catalog.user_agent, config.timeout())
        .context("Failed to build HTTP client")?;
    let client = CatalogClient::new(Arc::new(transport), &config.catalog.base_url);

    if no_cache || !config.cache.enabled {
        debug!("response cache disabled");
        return Ok(client);
    }

    let ttl = config.cache.ttl();
    let cache = match config.cache.dir().and_then(|dir| ResponseCache::new(dir, ttl)) {
        Ok(cache) => cache,
        Err(e) => {
            warn!("Disk cache unavailable, caching in memory only: {:#}", e);
            ResponseCache::in_memory(ttl)
        }
    };

    Ok(client.with_cache(cache))
}

/// Runtime for driving async fetches from the synchronous command entry points
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to create tokio runtime")
}
