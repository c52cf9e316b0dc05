//! Geographic coordinate type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when constructing an invalid coordinate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate: {reason}")]
pub struct InvalidCoordinate {
    reason: &'static str,
}

/// A WGS84 latitude/longitude pair.
///
/// Both components are finite and within range by construction. The serde
/// form is the two-element `[lat, lon]` array used by the coordinate cache
/// file.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Construct a coordinate, validating both components.
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidCoordinate> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(InvalidCoordinate {
                reason: "components must be finite",
            });
        }

        if !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidCoordinate {
                reason: "latitude must be within -90..=90",
            });
        }

        if !(-180.0..=180.0).contains(&lon) {
            return Err(InvalidCoordinate {
                reason: "longitude must be within -180..=180",
            });
        }

        Ok(Self { lat, lon })
    }

    /// Latitude in decimal degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate({}, {})", self.lat, self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = InvalidCoordinate;

    fn try_from((lat, lon): (f64, f64)) -> Result<Self, Self::Error> {
        Coordinate::new(lat, lon)
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(c: Coordinate) -> Self {
        (c.lat, c.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_valid() {
        let c = Coordinate::new(45.6983, 9.6773).unwrap();
        assert_eq!(c.lat(), 45.6983);
        assert_eq!(c.lon(), 9.6773);
    }

    #[test]
    fn boundary_values_accepted() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn reject_non_finite() {
        assert!(Coordinate::new(f64::NAN, 9.0).is_err());
        assert!(Coordinate::new(45.0, f64::INFINITY).is_err());
        assert!(Coordinate::new(f64::NEG_INFINITY, 9.0).is_err());
    }

    #[test]
    fn reject_out_of_range() {
        assert!(Coordinate::new(90.1, 0.0).is_err());
        assert!(Coordinate::new(-91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, 180.5).is_err());
        assert!(Coordinate::new(0.0, -200.0).is_err());
    }

    #[test]
    fn serde_array_form() {
        let c = Coordinate::new(45.7, 9.67).unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "[45.7,9.67]");

        let parsed: Coordinate = serde_json::from_str("[45.7,9.67]").unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    fn serde_rejects_invalid() {
        assert!(serde_json::from_str::<Coordinate>("[999.0,9.67]").is_err());
        assert!(serde_json::from_str::<Coordinate>("[45.7]").is_err());
        assert!(serde_json::from_str::<Coordinate>("\"45.7,9.67\"").is_err());
    }

    #[test]
    fn optional_coordinate_null_round_trip() {
        // The cache stores negative entries as JSON null
        let none: Option<Coordinate> = serde_json::from_str("null").unwrap();
        assert!(none.is_none());
        assert_eq!(serde_json::to_string(&none).unwrap(), "null");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any in-range pair constructs successfully.
        #[test]
        fn in_range_always_valid(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            prop_assert!(Coordinate::new(lat, lon).is_ok());
        }

        /// Serde round trip preserves both components exactly.
        #[test]
        fn serde_roundtrip(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let c = Coordinate::new(lat, lon).unwrap();
            let json = serde_json::to_string(&c).unwrap();
            let back: Coordinate = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back, c);
        }

        /// Out-of-range latitude is always rejected.
        #[test]
        fn out_of_range_lat_rejected(lat in 90.0f64..1e6, lon in -180.0f64..=180.0) {
            prop_assume!(lat > 90.0);
            prop_assert!(Coordinate::new(lat, lon).is_err());
        }
    }
}
