//! Coordinate model for geographic positions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::WorkToHomeError;

/// A point on the globe in decimal degrees.
///
/// Ranges are not enforced here; out-of-range values pass straight through
/// to the estimator and callers own their meaning.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Parses `"lat,lng"` as typed on the command line.
impl FromStr for Coordinate {
    type Err = WorkToHomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| WorkToHomeError::validation(format!("expected LAT,LNG, got '{s}'")))?;

        let latitude = lat
            .trim()
            .parse::<f64>()
            .map_err(|e| WorkToHomeError::validation(format!("bad latitude '{lat}': {e}")))?;
        let longitude = lng
            .trim()
            .parse::<f64>()
            .map_err(|e| WorkToHomeError::validation(format!("bad longitude '{lng}': {e}")))?;

        Ok(Self::new(latitude, longitude))
    }
}
