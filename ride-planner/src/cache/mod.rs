//! Persistent lookup caches.
//!
//! Two JSON-backed stores: geocoded coordinates per location key, and
//! driving routes per ordered `(start, end)` pair. Both load once at
//! construction (a missing file is an empty store), mutate in memory, and
//! write back only on an explicit save.

use std::path::Path;

mod coordinates;
mod error;
mod routes;

pub use coordinates::CoordinateStore;
pub use error::CacheError;
pub use routes::RouteStore;

/// File name of the coordinate cache inside a cache directory.
const COORDINATES_FILE: &str = "coordinates.json";

/// File name of the route cache inside a cache directory.
const ROUTES_FILE: &str = "routes.json";

/// The pair of stores backing the lookup facade.
pub struct Caches {
    /// Location key → coordinate (or cached-negative) store.
    pub coordinates: CoordinateStore,

    /// Ordered key pair → route record store.
    pub routes: RouteStore,
}

impl Caches {
    /// Open both stores inside `cache_dir`.
    ///
    /// Files that do not exist yet yield empty stores; the directory itself
    /// is only created when a store is first saved.
    pub fn open(cache_dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let dir = cache_dir.as_ref();
        Ok(Self {
            coordinates: CoordinateStore::load(dir.join(COORDINATES_FILE))?,
            routes: RouteStore::load(dir.join(ROUTES_FILE))?,
        })
    }

    /// Flush both stores to disk.
    pub async fn save_all(&self) -> Result<(), CacheError> {
        self.coordinates.save().await?;
        self.routes.save().await
    }
}

/// Create the parent directory of a cache file if it does not exist yet.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), CacheError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| CacheError::CreateDir {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}
