//! Persistent route cache.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::warn;

use crate::domain::{LocationKey, LonLat, RouteRecord};

use super::error::CacheError;

/// Separator between the two halves of a composite route key.
///
/// Location keys cannot contain this character, so a well-formed composite
/// key always splits back into exactly two valid keys.
const KEY_SEPARATOR: char = '-';

/// Wire form of a cached route entry.
///
/// The on-disk field names are inherited from the original cache format.
/// `geometry` is optional so that legacy records written without it can be
/// carried through a load/save cycle; such records are never served.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRoute {
    #[serde(rename = "durata_sec")]
    duration_secs: u32,

    #[serde(rename = "distanza_m")]
    distance_m: f64,

    #[serde(rename = "geometria", skip_serializing_if = "Option::is_none")]
    geometry: Option<Vec<LonLat>>,
}

/// On-disk map from ordered `(start, end)` pairs to route records.
///
/// The composite key is directional: a cached route A→B never answers a
/// lookup for B→A. An entry without geometry is incomplete and behaves as
/// absent for every lookup, while still surviving a save.
pub struct RouteStore {
    path: PathBuf,
    entries: RwLock<HashMap<(LocationKey, LocationKey), StoredRoute>>,
}

impl RouteStore {
    /// Load the store from `path`.
    ///
    /// A missing file yields an empty store. Entries whose composite key
    /// does not split into exactly two valid location keys, or whose value
    /// does not parse, are dropped with a warning.
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

    /// True iff a record exists for `(start, end)` and carries geometry.
    pub async fn has_complete(&self, start: &LocationKey, end: &LocationKey) -> bool {
        self.entries
            .read()
            .await
            .get(&(start.clone(), end.clone()))
            .is_some_and(|stored| stored.geometry.is_some())
    }

    /// Look up the complete record for `(start, end)`.
    ///
    /// Returns `None` for both missing and incomplete entries.
    pub async fn get(&self, start: &LocationKey, end: &LocationKey) -> Option<RouteRecord> {
        let entries = self.entries.read().await;
        let stored = entries.get(&(start.clone(), end.clone()))?;
        let geometry = stored.geometry.clone()?;

        Some(RouteRecord {
            start: start.clone(),
            end: end.clone(),
            duration_secs: stored.duration_secs,
            distance_m: stored.distance_m,
            geometry,
        })
    }

    /// Write or overwrite the entry for the record's key pair.
    ///
    /// Records always carry geometry, so entries written here are complete
    /// by construction.
    pub async fn set(&self, record: &RouteRecord) {
        let stored = StoredRoute {
            duration_secs: record.duration_secs,
            distance_m: record.distance_m,
            geometry: Some(record.geometry.clone()),
        };

        self.entries
            .write()
            .await
            .insert((record.start.clone(), record.end.clone()), stored);
    }

    /// Number of entries, complete and incomplete.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Write the full map back to disk, creating parent directories as
    /// needed. Keys are written in sorted order so the file diffs cleanly.
    pub async fn save(&self) -> Result<(), CacheError> {
        let entries = self.entries.read().await;
        let by_key: BTreeMap<String, &StoredRoute> = entries
            .iter()
            .map(|((start, end), stored)| (composite_key(start, end), stored))
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

/// Render the composite `START-END` key for an ordered pair.
fn composite_key(start: &LocationKey, end: &LocationKey) -> String {
    format!("{start}{KEY_SEPARATOR}{end}")
}

/// Split a composite key back into its two halves.
///
/// Anything that does not split into exactly two valid location keys is
/// malformed; the caller decides whether to quarantine or fail.
fn parse_composite_key(key: &str) -> Result<(LocationKey, LocationKey), String> {
    let mut parts = key.split(KEY_SEPARATOR);
    let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!(
            "expected exactly one '{KEY_SEPARATOR}' separator in {key:?}"
        ));
    };

    let start = LocationKey::parse(start).map_err(|e| e.to_string())?;
    let end = LocationKey::parse(end).map_err(|e| e.to_string())?;
    Ok((start, end))
}

fn parse_entries(
    path: &Path,
    contents: &str,
) -> Result<HashMap<(LocationKey, LocationKey), StoredRoute>, CacheError> {
    let raw: HashMap<String, Value> =
        serde_json::from_str(contents).map_err(|e| CacheError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut entries = HashMap::with_capacity(raw.len());
    for (key, value) in raw {
        let pair = match parse_composite_key(&key) {
            Ok(pair) => pair,
            Err(e) => {
                warn!(key = %key, error = %e, "dropping route cache entry with malformed key");
                continue;
            }
        };

        match serde_json::from_value::<StoredRoute>(value) {
            Ok(stored) => {
                entries.insert(pair, stored);
            }
            Err(e) => {
                warn!(key = %key, error = %e, "dropping malformed route cache entry");
            }
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    fn key(s: &str) -> LocationKey {
        LocationKey::parse(s).unwrap()
    }

    fn sample_route() -> RouteRecord {
        RouteRecord {
            start: key("BERGAMO"),
            end: key("DALMINE"),
            duration_secs: 720,
            distance_m: 12500.0,
            geometry: vec![(9.6773, 45.6983), (9.5969, 45.6469)],
        }
    }

    #[tokio::test]
    async fn missing_file_yields_empty_store() {
        let dir = tempdir().unwrap();
        let store = RouteStore::load(dir.path().join("routes.json")).unwrap();

        assert!(store.is_empty().await);
        assert!(!store.has_complete(&key("BERGAMO"), &key("DALMINE")).await);
        assert!(store.get(&key("BERGAMO"), &key("DALMINE")).await.is_none());
    }

    #[tokio::test]
    async fn set_then_get_round_trip() {
        let dir = tempdir().unwrap();
        let store = RouteStore::load(dir.path().join("routes.json")).unwrap();

        let route = sample_route();
        store.set(&route).await;

        assert!(store.has_complete(&key("BERGAMO"), &key("DALMINE")).await);
        assert_eq!(
            store.get(&key("BERGAMO"), &key("DALMINE")).await,
            Some(route)
        );
    }

    #[tokio::test]
    async fn composite_key_is_directional() {
        let dir = tempdir().unwrap();
        let store = RouteStore::load(dir.path().join("routes.json")).unwrap();

        store.set(&sample_route()).await;

        assert!(!store.has_complete(&key("DALMINE"), &key("BERGAMO")).await);
        assert!(store.get(&key("DALMINE"), &key("BERGAMO")).await.is_none());
    }

    #[tokio::test]
    async fn empty_geometry_is_still_complete() {
        let dir = tempdir().unwrap();
        let store = RouteStore::load(dir.path().join("routes.json")).unwrap();

        let route = RouteRecord {
            geometry: Vec::new(),
            ..sample_route()
        };
        store.set(&route).await;

        assert!(store.has_complete(&key("BERGAMO"), &key("DALMINE")).await);
        assert_eq!(
            store.get(&key("BERGAMO"), &key("DALMINE")).await,
            Some(route)
        );
    }

    #[tokio::test]
    async fn incomplete_record_is_never_served_but_survives_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("routes.json");
        std::fs::write(
            &path,
            r#"{"BERGAMO-DALMINE": {"durata_sec": 720, "distanza_m": 12500.0}}"#,
        )
        .unwrap();

        let store = RouteStore::load(&path).unwrap();
        assert_eq!(store.len().await, 1);
        assert!(!store.has_complete(&key("BERGAMO"), &key("DALMINE")).await);
        assert!(store.get(&key("BERGAMO"), &key("DALMINE")).await.is_none());

        store.save().await.unwrap();

        // The legacy entry is carried through the save, still without
        // a geometry field.
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["BERGAMO-DALMINE"]["durata_sec"], 720);
        assert!(raw["BERGAMO-DALMINE"].get("geometria").is_none());
    }

    #[tokio::test]
    async fn save_and_reload_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("routes.json");

        let store = RouteStore::load(&path).unwrap();
        store.set(&sample_route()).await;
        store.save().await.unwrap();

        let reloaded = RouteStore::load(&path).unwrap();
        assert_eq!(
            reloaded.get(&key("BERGAMO"), &key("DALMINE")).await,
            Some(sample_route())
        );
    }

    #[tokio::test]
    async fn wire_format_field_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("routes.json");

        let store = RouteStore::load(&path).unwrap();
        store.set(&sample_route()).await;
        store.save().await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let entry = &raw["BERGAMO-DALMINE"];
        assert_eq!(entry["durata_sec"], 720);
        assert_eq!(entry["distanza_m"], 12500.0);
        assert_eq!(entry["geometria"][0], serde_json::json!([9.6773, 45.6983]));
    }

    #[tokio::test]
    async fn malformed_keys_are_quarantined() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("routes.json");
        std::fs::write(
            &path,
            r#"{
                "BERGAMO-DALMINE": {"durata_sec": 720, "distanza_m": 12500.0, "geometria": []},
                "A-B-C": {"durata_sec": 1, "distanza_m": 1.0, "geometria": []},
                "NOSEPARATOR": {"durata_sec": 1, "distanza_m": 1.0, "geometria": []},
                "BERGAMO-": {"durata_sec": 1, "distanza_m": 1.0, "geometria": []}
            }"#,
        )
        .unwrap();

        let store = RouteStore::load(&path).unwrap();
        assert_eq!(store.len().await, 1);
        assert!(store.has_complete(&key("BERGAMO"), &key("DALMINE")).await);
    }

    #[tokio::test]
    async fn malformed_values_are_quarantined() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("routes.json");
        std::fs::write(
            &path,
            r#"{
                "BERGAMO-DALMINE": {"durata_sec": -5, "distanza_m": 12500.0, "geometria": []},
                "BERGAMO-TREVIGLIO": {"durata_sec": 900, "distanza_m": 20000.0, "geometria": []}
            }"#,
        )
        .unwrap();

        let store = RouteStore::load(&path).unwrap();
        assert_eq!(store.len().await, 1);
        assert!(store.has_complete(&key("BERGAMO"), &key("TREVIGLIO")).await);
    }

    #[test]
    fn parse_composite_key_accepts_two_valid_halves() {
        let (start, end) = parse_composite_key("BERGAMO-DALMINE").unwrap();
        assert_eq!(start, key("BERGAMO"));
        assert_eq!(end, key("DALMINE"));
    }

    #[test]
    fn parse_composite_key_rejects_malformed() {
        assert!(parse_composite_key("A-B-C").is_err());
        assert!(parse_composite_key("NOSEPARATOR").is_err());
        assert!(parse_composite_key("-DALMINE").is_err());
        assert!(parse_composite_key("BERGAMO-").is_err());
    }
}
