//! Student roster loading.
//!
//! Reads the ride-share roster from a JSON input file and normalizes each
//! record. A row that does not parse is skipped with a warning rather than
//! failing the whole load; a location the directory does not know is
//! flagged but kept, since the coordinate cache will record the failed
//! geocode anyway.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::config::LocationDirectory;
use crate::domain::{InvalidLocationKey, LocationKey};

/// Errors from loading the student roster.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// The roster file does not exist.
    #[error("roster file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Reading the roster file failed.
    #[error("failed to read roster file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The roster file does not have the expected JSON shape.
    #[error("malformed roster file {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },
}

/// Wire form of the roster file.
#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(rename = "studenti")]
    students: Vec<Value>,
}

/// Wire form of one roster row.
#[derive(Debug, Deserialize)]
struct StudentRow {
    email: String,

    #[serde(rename = "localita")]
    location: String,

    #[serde(rename = "corso")]
    course: String,
}

/// A student record with normalized fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    /// Unique identifier, lowercased.
    pub email: String,

    /// Pickup location key.
    pub location: LocationKey,

    /// Degree course, uppercased.
    pub course: String,
}

impl Student {
    fn from_row(row: StudentRow) -> Result<Self, InvalidLocationKey> {
        Ok(Self {
            email: row.email.to_lowercase(),
            location: LocationKey::parse(&row.location)?,
            course: row.course.to_uppercase(),
        })
    }
}

/// Load and normalize the roster.
///
/// Rows are parsed individually so one bad row cannot take down the rest.
pub fn load_roster(
    path: impl AsRef<Path>,
    directory: &LocationDirectory,
) -> Result<Vec<Student>, RosterError> {
    let path = path.as_ref();

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RosterError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(RosterError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let file: RosterFile = serde_json::from_str(&contents).map_err(|e| RosterError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut students = Vec::with_capacity(file.students.len());
    for (index, raw) in file.students.into_iter().enumerate() {
        let row: StudentRow = match serde_json::from_value(raw) {
            Ok(row) => row,
            Err(e) => {
                warn!(row = index + 1, error = %e, "skipping malformed roster row");
                continue;
            }
        };

        let student = match Student::from_row(row) {
            Ok(student) => student,
            Err(e) => {
                warn!(row = index + 1, error = %e, "skipping roster row with invalid location key");
                continue;
            }
        };

        if directory.display_name(&student.location).is_none() {
            warn!(
                email = %student.email,
                location = %student.location,
                "student location is not in the directory"
            );
        }

        students.push(student);
    }

    Ok(students)
}
