//! Static location configuration.
//!
//! Maps location keys to the display names used for geocoding queries and
//! records which keys are sub-localities of the configured city (district
//! names need the city appended to geocode inside it). Loaded once at
//! startup from `localita.json` and `quartieri.json`; read-only afterwards.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::domain::LocationKey;

/// File holding the key → display name map.
const LOCATIONS_FILE: &str = "localita.json";

/// File holding the list of sub-locality keys.
const SUB_LOCALITIES_FILE: &str = "quartieri.json";

/// Default geocoding context appended to ordinary locations.
const DEFAULT_COUNTRY_CONTEXT: &str = "Italia";

/// Default geocoding context appended to sub-localities.
const DEFAULT_CITY_CONTEXT: &str = "Bergamo, BG, Italia";

/// Errors from loading the location configuration.
///
/// Unlike the caches, the configuration is required input: a missing or
/// malformed file fails the load outright.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading a config file failed (including it not existing).
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file does not have the expected JSON shape.
    #[error("malformed config file {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },
}

/// Read-only lookup of location display names and sub-locality flags.
pub struct LocationDirectory {
    names: HashMap<LocationKey, String>,
    sub_localities: HashSet<LocationKey>,
    country_context: String,
    city_context: String,
}

impl LocationDirectory {
    /// Load the directory from `config_dir`.
    ///
    /// Expects `localita.json` (object mapping key → display name) and
    /// `quartieri.json` (array of sub-locality keys). Keys that do not
    /// parse fail the load: configuration is authored by hand and a bad
    /// key there is a mistake worth surfacing.
    pub fn load(config_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = config_dir.as_ref();

        let locations_path = dir.join(LOCATIONS_FILE);
        let names_raw: HashMap<String, String> = read_json(&locations_path)?;
        let mut names = HashMap::with_capacity(names_raw.len());
        for (key, name) in names_raw {
            let key = LocationKey::parse(&key).map_err(|e| ConfigError::Malformed {
                path: locations_path.clone(),
                message: format!("key {key:?}: {e}"),
            })?;
            names.insert(key, name);
        }

        let subs_path = dir.join(SUB_LOCALITIES_FILE);
        let subs_raw: Vec<String> = read_json(&subs_path)?;
        let mut sub_localities = HashSet::with_capacity(subs_raw.len());
        for key in subs_raw {
            let key = LocationKey::parse(&key).map_err(|e| ConfigError::Malformed {
                path: subs_path.clone(),
                message: format!("key {key:?}: {e}"),
            })?;
            sub_localities.insert(key);
        }

        Ok(Self::from_tables(names, sub_localities))
    }

    /// Build a directory from in-memory tables (for tests and embedders).
    pub fn from_tables(
        names: HashMap<LocationKey, String>,
        sub_localities: HashSet<LocationKey>,
    ) -> Self {
        Self {
            names,
            sub_localities,
            country_context: DEFAULT_COUNTRY_CONTEXT.to_string(),
            city_context: DEFAULT_CITY_CONTEXT.to_string(),
        }
    }

    /// Override the geocoding contexts appended to queries.
    pub fn with_contexts(
        mut self,
        country_context: impl Into<String>,
        city_context: impl Into<String>,
    ) -> Self {
        self.country_context = country_context.into();
        self.city_context = city_context.into();
        self
    }

    /// Display name for a key (e.g. `BERGAMO` → "Bergamo").
    pub fn display_name(&self, key: &LocationKey) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }

    /// True if the key names a sub-locality of the configured city.
    pub fn is_sub_locality(&self, key: &LocationKey) -> bool {
        self.sub_localities.contains(key)
    }

    /// Context appended to ordinary location queries.
    pub fn country_context(&self) -> &str {
        &self.country_context
    }

    /// Context appended to sub-locality queries.
    pub fn city_context(&self) -> &str {
        &self.city_context
    }

    /// Number of known locations.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if no locations are configured.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&contents).map_err(|e| ConfigError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
