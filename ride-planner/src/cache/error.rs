//! Cache error types.

use std::path::PathBuf;

/// Errors from the persistent cache stores.
///
/// Only whole-file failures surface here: an unreadable or structurally
/// invalid cache file, or a failed flush. Individually malformed entries are
/// quarantined at load time instead (dropped with a warning).
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Reading the backing file failed (other than it not existing).
    #[error("failed to read cache file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a JSON object.
    #[error("malformed cache file {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },

    /// Creating the parent directory for the backing file failed.
    #[error("failed to create cache directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the in-memory map failed.
    #[error("failed to serialize cache for {}: {message}", path.display())]
    Serialize { path: PathBuf, message: String },

    /// Writing the backing file failed.
    #[error("failed to write cache file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CacheError::Malformed {
            path: PathBuf::from("/tmp/coordinates.json"),
            message: "expected object".into(),
        };
        assert_eq!(
            err.to_string(),
            "malformed cache file /tmp/coordinates.json: expected object"
        );
    }
}
