//! Persistent coordinate cache.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::warn;

use crate::domain::{Coordinate, LocationKey};

use super::error::CacheError;

/// On-disk map from location key to geocoded coordinate.
///
/// Each entry is either `Some(coordinate)` or `None`, where `None` records
/// that the geocoding provider was asked and had no answer. That negative
/// entry is a stable fact worth keeping: it stops the same failing lookup
/// from going back to the provider on every run.
///
/// The store loads once at construction and mutates in memory; nothing is
/// written back until [`save`](Self::save).
pub struct CoordinateStore {
    path: PathBuf,
    entries: RwLock<HashMap<LocationKey, Option<Coordinate>>>,
}

impl CoordinateStore {
    /// Load the store from `path`.
    ///
    /// A missing file yields an empty store. A file that exists but is not
    /// a JSON object is a [`CacheError`]. Entries whose key or value do not
    /// parse are dropped with a warning rather than poisoning the rest.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => parse_entries(&path, &contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(CacheError::Read { path, source: e }),
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// True if `key` has ever been resolved, including to "not found".
    pub async fn has(&self, key: &LocationKey) -> bool {
        self.entries.read().await.contains_key(key)
    }

    /// Two-level lookup: the outer `None` means the key was never cached,
    /// `Some(None)` means the provider was asked and found nothing.
    pub async fn get(&self, key: &LocationKey) -> Option<Option<Coordinate>> {
        self.entries.read().await.get(key).copied()
    }

    /// Record the outcome of a lookup, overwriting any previous entry.
    ///
    /// Pass `None` to store a negative entry.
    pub async fn set(&self, key: LocationKey, coordinate: Option<Coordinate>) {
        self.entries.write().await.insert(key, coordinate);
    }

    /// Number of cached entries, positive and negative.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True if nothing has been cached yet.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Write the full map back to disk, creating parent directories as
    /// needed. Keys are written in sorted order so the file diffs cleanly.
    pub async fn save(&self) -> Result<(), CacheError> {
        let entries = self.entries.read().await;
        let by_key: BTreeMap<&str, &Option<Coordinate>> = entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
            .collect();

        let json = serde_json::to_string_pretty(&by_key).map_err(|e| CacheError::Serialize {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        super::ensure_parent_dir(&self.path)?;
        std::fs::write(&self.path, json).map_err(|e| CacheError::Write {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_entries(
    path: &Path,
    contents: &str,
) -> Result<HashMap<LocationKey, Option<Coordinate>>, CacheError> {
    let raw: HashMap<String, Value> =
        serde_json::from_str(contents).map_err(|e| CacheError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut entries = HashMap::with_capacity(raw.len());
    for (key, value) in raw {
        let parsed_key = match LocationKey::parse(&key) {
            Ok(k) => k,
            Err(e) => {
                warn!(key = %key, error = %e, "dropping coordinate cache entry with invalid key");
                continue;
            }
        };

        match serde_json::from_value::<Option<Coordinate>>(value) {
            Ok(coordinate) => {
                entries.insert(parsed_key, coordinate);
            }
            Err(e) => {
                warn!(key = %key, error = %e, "dropping malformed coordinate cache entry");
            }
        }
    }

    Ok(entries)
}
