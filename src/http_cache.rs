use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use moka::Expiry;
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use tracing::debug;

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "ladder_digest";
const CACHE_FILE: &str = "http_cache.json";
pub const DEFAULT_MAX_ENTRIES: u64 = 1024;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct HttpCacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    body: String,
    fetched_at: u64,
    ttl_secs: u64,
}

impl CacheEntry {
    fn remaining(&self, now: u64) -> Duration {
        let age = now.saturating_sub(self.fetched_at);
        Duration::from_secs(self.ttl_secs.saturating_sub(age))
    }
}

// Each entry lives for whatever is left of its own TTL.
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.remaining(now_secs()))
    }
}

/// Response bodies keyed by URL, each with its own time-to-live and a bound
/// on the entry count. Optionally mirrored to a JSON file so restarts keep
/// warm entries.
pub struct HttpCache {
    entries: Cache<String, CacheEntry>,
    path: Option<PathBuf>,
    save_lock: Mutex<()>,
}

impl HttpCache {
    pub fn in_memory(max_entries: u64) -> Self {
        Self {
            entries: build_cache(max_entries),
            path: None,
            save_lock: Mutex::new(()),
        }
    }

    /// Load fresh entries from `path` (if readable) and persist future
    /// inserts there.
    pub fn persistent(path: PathBuf, max_entries: u64) -> Self {
        let entries = build_cache(max_entries);
        if let Some(file) = load_cache_file(&path) {
            let now = now_secs();
            for (key, entry) in file.entries {
                if !entry.remaining(now).is_zero() {
                    entries.insert(key, entry);
                }
            }
        }
        Self {
            entries,
            path: Some(path),
            save_lock: Mutex::new(()),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        debug!(key, "http cache hit");
        Some(entry.body)
    }

    pub fn insert(&self, key: &str, body: String, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                body,
                fetched_at: now_secs(),
                ttl_secs: ttl.as_secs(),
            },
        );

        if let Some(path) = self.path.as_ref() {
            let _guard = self.save_lock.lock().expect("http cache lock poisoned");
            let file = HttpCacheFile {
                version: CACHE_VERSION,
                entries: self
                    .entries
                    .iter()
                    .map(|(k, v)| (k.as_ref().clone(), v))
                    .collect(),
            };
            if let Err(err) = save_cache_file(path, &file) {
                debug!(error = %err, "http cache not persisted");
            }
        }
    }

    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn build_cache(max_entries: u64) -> Cache<String, CacheEntry> {
    Cache::builder()
        .max_capacity(max_entries.max(1))
        .expire_after(EntryTtl)
        .build()
}

fn load_cache_file(path: &Path) -> Option<HttpCacheFile> {
    let raw = fs::read_to_string(path).ok()?;
    let cache = serde_json::from_str::<HttpCacheFile>(&raw).ok()?;
    if cache.version != CACHE_VERSION {
        return None;
    }
    Some(cache)
}

fn save_cache_file(path: &Path, cache: &HttpCacheFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize http cache")?;
    fs::write(&tmp, json).context("write http cache")?;
    fs::rename(&tmp, path).context("swap http cache")?;
    Ok(())
}

pub fn default_cache_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR).join(CACHE_FILE))
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
