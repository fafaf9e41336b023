//! Cache command - inspect or empty the response cache

use anyhow::Result;
use colored::Colorize;

use crate::cache::ResponseCache;
use crate::config::Config;

/// Print the directory responses are cached in
pub fn path(config: &Config) -> Result<()> {
    let dir = config.cache.dir()?;
    println!("{}", dir.display());
    if !config.cache.enabled {
        println!("{}", "(caching is disabled in config)".dimmed());
    }
    Ok(())
}

/// Delete every cached response
pub fn clear(config: &Config) -> Result<()> {
    let dir = config.cache.dir()?;
    if !dir.exists() {
        println!("No cached responses to clear.");
        return Ok(());
    }

    let cache = ResponseCache::new(dir, config.cache.ttl())?;
    let count = cache.clear()?;

    if count == 0 {
        println!("No cached responses to clear.");
    } else {
        let location = cache
            .dir()
            .map(|d| d.display().to_string())
            .unwrap_or_default();
        println!(
            "{} Removed {} cached response(s) from {}",
            "✓".green(),
            count,
            location
        );
    }

    Ok(())
}
