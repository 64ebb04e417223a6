//! Disk-backed cache for upstream API responses
//!
//! Provides a `CacheStore` that persists JSON-serializable payloads to one
//! file per key inside a per-namespace subdirectory, with time-based expiry
//! checked on read.

use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by cache writes and clears
///
/// Reads never fail: a missing, corrupt, or expired entry is reported as
/// absent so the caller falls through to a fresh fetch.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem operation failed
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Payload could not be serialized to JSON
    #[error("cache entry could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Wire format of a cache entry on disk
///
/// `timestamp` also accepts `last_updated` on read, the field name the
/// whole-snapshot namespace was historically written with.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// Unix seconds recorded at write time
    #[serde(alias = "last_updated")]
    timestamp: f64,
    /// The cached payload, opaque to the store
    data: T,
}

/// Namespaced key-value store for JSON payloads with time-based expiry
///
/// Each store owns one subdirectory of the cache root (one per upstream data
/// source), so key derivation in different sources can never collide.
/// Entries older than the expiry window are treated as absent on read but
/// stay on disk until overwritten or cleared.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Directory holding this namespace's entry files
    dir: PathBuf,
    /// Maximum age before an entry is considered stale
    expiry: Duration,
}

impl CacheStore {
    /// Creates a store for `namespace` under `root` with the given expiry
    pub fn new(root: &Path, namespace: &str, expiry: Duration) -> Self {
        Self {
            dir: root.join(namespace),
            expiry,
        }
    }

    /// Returns the path of the entry file for the given key
    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Loads the payload stored under `key` if it exists and is still fresh
    ///
    /// Missing files, unreadable JSON, and expired entries all come back as
    /// `None`; the caller re-fetches and overwrites.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let content = fs::read_to_string(self.entry_path(key)).ok()?;
        let entry: CacheEntry<T> = serde_json::from_str(&content).ok()?;

        let age = Utc::now().timestamp() as f64 - entry.timestamp;
        is_fresh(age, self.expiry).then_some(entry.data)
    }

    /// Persists `data` under `key`, overwriting any previous entry
    ///
    /// The entry is written to a temporary file and renamed into place so a
    /// reader never observes a partial write. Creates the namespace
    /// directory on first use.
    pub fn put<T: Serialize>(&self, key: &str, data: &T) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;

        let entry = CacheEntry {
            timestamp: Utc::now().timestamp() as f64,
            data,
        };
        let json = serde_json::to_string(&entry)?;

        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, self.entry_path(key))?;
        Ok(())
    }

    /// Removes every entry in the namespace
    ///
    /// Idempotent: clearing a namespace that was never written succeeds.
    pub fn clear(&self) -> Result<(), CacheError> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// An entry aged exactly to the expiry window is still fresh.
fn is_fresh(age_seconds: f64, expiry: Duration) -> bool {
    age_seconds <= expiry.as_secs_f64()
}

/// Derives the cache key for a parameterized request
///
/// The key is a pure function of the logical request: parameters are sorted
/// by name before hashing, so the same endpoint and parameter set always map
/// to the same key regardless of insertion order, and different requests get
/// distinct keys.
pub fn request_key(url: &str, params: &[(&str, String)]) -> String {
    let mut identity = url.to_string();
    if !params.is_empty() {
        let mut sorted: Vec<&(&str, String)> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let query: Vec<String> = sorted.iter().map(|(k, v)| format!("{k}={v}")).collect();
        identity.push('?');
        identity.push_str(&query.join("&"));
    }
    format!("{:x}", Sha256::digest(identity.as_bytes()))
}
