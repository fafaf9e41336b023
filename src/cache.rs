//! Response cache with an explicit staleness window
//!
//! Raw response bodies are stored, not normalized books, so every fetch
//! still builds fresh [`Book`](crate::catalog::Book) records. Entries live
//! in memory for the process and, when a directory is configured, as
//! `<hash>.json` files that outlast it.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

/// What a cached body answers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Search { query: String, page: u32, limit: u32 },
    Work { id: String },
}

impl CacheKey {
    /// Stable textual form, stored alongside the body and hashed for the file name
    pub fn canonical(&self) -> String {
        match self {
            CacheKey::Search { query, page, limit } => {
                format!("search\n{}\n{}\n{}", query, page, limit)
            }
            CacheKey::Work { id } => format!("work\n{}", id),
        }
    }
}

/// Time-to-live per key kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl {
    pub search: Duration,
    pub work: Duration,
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self {
            search: Duration::from_secs(5 * 60),
            work: Duration::from_secs(60 * 60),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    key: String,
    fetched_at: DateTime<Utc>,
    body: String,
}

/// Request cache keyed by [`CacheKey`]
pub struct ResponseCache {
    dir: Option<PathBuf>,
    ttl: CacheTtl,
    memory: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    /// Create a cache backed by `dir`, creating the directory if needed
    pub fn new(dir: PathBuf, ttl: CacheTtl) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;

        Ok(Self {
            dir: Some(dir),
            ttl,
            memory: Mutex::new(HashMap::new()),
        })
    }

    /// Create a cache that only lives as long as the process
    pub fn in_memory(ttl: CacheTtl) -> Self {
        Self {
            dir: None,
            ttl,
            memory: Mutex::new(HashMap::new()),
        }
    }

    /// Default on-disk location (~/.cache/bookbrowse/responses on Linux)
    pub fn default_dir() -> Result<PathBuf> {
        Ok(dirs::cache_dir()
            .context("Could not determine cache directory")?
            .join("bookbrowse")
            .join("responses"))
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn ttl_for(&self, key: &CacheKey) -> Duration {
        match key {
            CacheKey::Search { .. } => self.ttl.search,
            CacheKey::Work { .. } => self.ttl.work,
        }
    }

    /// Hash a canonical key to a 16-char hex string
    fn hash_key(canonical: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }

    fn path_for(&self, canonical: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", Self::hash_key(canonical))))
    }

    fn is_fresh(&self, key: &CacheKey, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        // Entries stamped in the future (clock change) are treated as stale
        now.signed_duration_since(entry.fetched_at)
            .to_std()
            .map(|age| age < self.ttl_for(key))
            .unwrap_or(false)
    }

    /// Look up a body that is still inside its staleness window at `now`
    pub fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<String> {
        let canonical = key.canonical();

        if let Ok(mut memory) = self.memory.lock() {
            if let Some(entry) = memory.get(&canonical) {
                if self.is_fresh(key, entry, now) {
                    debug!(key = %canonical.replace('\n', " "), "cache hit (memory)");
                    return Some(entry.body.clone());
                }
                memory.remove(&canonical);
            }
        }

        let entry = self.read_entry(&canonical)?;
        if !self.is_fresh(key, &entry, now) {
            debug!(key = %canonical.replace('\n', " "), "cache entry expired");
            self.remove_file(&canonical);
            return None;
        }

        debug!(key = %canonical.replace('\n', " "), "cache hit (disk)");
        let body = entry.body.clone();
        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(canonical, entry);
        }
        Some(body)
    }

    fn remove_file(&self, canonical: &str) {
        if let Some(path) = self.path_for(canonical) {
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to remove expired cache entry {}: {}", path.display(), e);
            }
        }
    }

    fn read_entry(&self, canonical: &str) -> Option<CacheEntry> {
        let path = self.path_for(canonical)?;
        if !path.exists() {
            return None;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&content) {
            // A different key hashing to the same name is a miss
            Ok(entry) if entry.key == canonical => Some(entry),
            Ok(_) => None,
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Store a successful response body fetched at `now`
    pub fn put(&self, key: &CacheKey, body: &str, now: DateTime<Utc>) -> Result<()> {
        let canonical = key.canonical();
        let entry = CacheEntry {
            key: canonical.clone(),
            fetched_at: now,
            body: body.to_string(),
        };

        if let Some(path) = self.path_for(&canonical) {
            let json = serde_json::to_string(&entry)?;
            fs::write(&path, json)
                .with_context(|| format!("Failed to write cache entry: {}", path.display()))?;
        }

        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(canonical, entry);
        }

        Ok(())
    }

    /// Remove every cached response, returning how many files were deleted
    pub fn clear(&self) -> Result<usize> {
        if let Ok(mut memory) = self.memory.lock() {
            memory.clear();
        }

        let mut count = 0;
        if let Some(dir) = &self.dir {
            if dir.exists() {
                for entry in fs::read_dir(dir)? {
                    let path = entry?.path();
                    if path.extension().map_or(false, |e| e == "json") {
                        fs::remove_file(&path).with_context(|| {
                            format!("Failed to remove cache entry: {}", path.display())
                        })?;
                        count += 1;
                    }
                }
            }
        }

        Ok(count)
    }
}
