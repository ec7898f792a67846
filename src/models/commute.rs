//! Commute estimate and stored commute history records

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{HousingId, UserId};
use crate::WorkToHomeError;

pub type CommuteId = Uuid;

/// Mode of travel a commute is estimated for
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum RouteType {
    #[default]
    Driving,
    Walking,
    Transit,
    Biking,
}

impl RouteType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RouteType::Driving => "driving",
            RouteType::Walking => "walking",
            RouteType::Transit => "transit",
            RouteType::Biking => "biking",
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteType {
    type Err = WorkToHomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driving" => Ok(RouteType::Driving),
            "walking" => Ok(RouteType::Walking),
            "transit" => Ok(RouteType::Transit),
            "biking" => Ok(RouteType::Biking),
            other => Err(WorkToHomeError::validation(format!(
                "unknown route type '{other}', expected one of driving, walking, transit, biking"
            ))),
        }
    }
}

/// Distance, duration and cost from a work location to a listing.
///
/// Cost fields are `None` when they do not apply to the route type, which is
/// different from a cost of zero.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CommuteEstimate {
    pub distance_miles: f64,
    pub duration_minutes: u32,
    pub route_type: RouteType,
    pub fuel_cost: Option<f64>,
    /// Not modelled; always `None`
    pub parking_cost: Option<f64>,
    pub total_cost: Option<f64>,
}

/// An estimate persisted against a user and a listing
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CommuteRecord {
    pub id: CommuteId,
    pub user_id: UserId,
    pub housing_id: HousingId,
    pub estimate: CommuteEstimate,
    pub calculated_at: DateTime<Utc>,
}

impl CommuteRecord {
    #[must_use]
    pub fn new(user_id: UserId, housing_id: HousingId, estimate: CommuteEstimate) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            housing_id,
            estimate,
            calculated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("driving", RouteType::Driving)]
    #[case("Walking", RouteType::Walking)]
    #[case(" transit ", RouteType::Transit)]
    #[case("BIKING", RouteType::Biking)]
    fn test_route_type_parse(#[case] input: &str, #[case] expected: RouteType) {
        assert_eq!(input.parse::<RouteType>().unwrap(), expected);
    }

    #[test]
    fn test_route_type_rejects_unknown() {
        let err = "teleport".parse::<RouteType>().unwrap_err();
        assert!(matches!(err, WorkToHomeError::Validation { .. }));
    }

    #[test]
    fn test_route_type_serde_is_lowercase() {
        let json = serde_json::to_string(&RouteType::Transit).unwrap();
        assert_eq!(json, "\"transit\"");
        assert_eq!(RouteType::default(), RouteType::Driving);
    }
}
