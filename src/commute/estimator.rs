//! Commute estimation from a work location to a listing
//!
//! Distance is the great-circle (haversine) distance. Duration and cost are a
//! fixed linear approximation of that distance; there is no routing or
//! traffic model behind them.

use serde::{Deserialize, Serialize};

use crate::models::{CommuteEstimate, Coordinate, RouteType};
use crate::{Result, WorkToHomeError};

/// Mean Earth radius in miles
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Minutes of travel per mile, for every route type
pub const MINUTES_PER_MILE: f64 = 2.0;

pub const FUEL_PRICE_PER_GALLON: f64 = 3.50;
pub const MILES_PER_GALLON: f64 = 25.0;
/// Flat parking charge added to every driving commute
pub const PARKING_SURCHARGE: f64 = 10.0;

/// Fuel and total cost of a commute, `None` where not applicable
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct CostBreakdown {
    pub fuel_cost: Option<f64>,
    pub total_cost: Option<f64>,
}

/// Great-circle distance between two coordinates in miles.
///
/// The haversine term is clamped to `[0, 1]` so rounding near antipodal
/// points can't push `asin` out of its domain.
#[must_use]
pub fn compute_distance(work: &Coordinate, target: &Coordinate) -> f64 {
    let lat1 = work.latitude.to_radians();
    let lat2 = target.latitude.to_radians();
    let d_lat = (target.latitude - work.latitude).to_radians();
    let d_lng = (target.longitude - work.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_MILES * c
}

/// Travel time in whole minutes: `round(distance * 2)`.
///
/// Negative and NaN distances give 0.
#[must_use]
pub fn estimate_duration(distance_miles: f64) -> u32 {
    // `as` saturates at u32::MAX and maps NaN to 0
    (distance_miles * MINUTES_PER_MILE).round().max(0.0) as u32
}

/// Fuel cost at $3.50/gal and 25 mpg plus a $10 parking surcharge.
/// Only driving has a cost model.
#[must_use]
pub fn estimate_cost(distance_miles: f64, route_type: RouteType) -> CostBreakdown {
    match route_type {
        RouteType::Driving => {
            let fuel_cost = (distance_miles / MILES_PER_GALLON) * FUEL_PRICE_PER_GALLON;
            CostBreakdown {
                fuel_cost: Some(fuel_cost),
                total_cost: Some(fuel_cost + PARKING_SURCHARGE),
            }
        }
        RouteType::Walking | RouteType::Transit | RouteType::Biking => CostBreakdown::default(),
    }
}

/// Distance, duration and cost from `work` to `target`.
///
/// Pure: identical inputs always give an identical estimate.
#[must_use]
pub fn build_estimate(work: &Coordinate, target: &Coordinate, route_type: RouteType) -> CommuteEstimate {
    let distance_miles = compute_distance(work, target);
    let duration_minutes = estimate_duration(distance_miles);
    let cost = estimate_cost(distance_miles, route_type);

    CommuteEstimate {
        distance_miles,
        duration_minutes,
        route_type,
        fuel_cost: cost.fuel_cost,
        parking_cost: None,
        total_cost: cost.total_cost,
    }
}

/// [`build_estimate`] for callers whose coordinates may be unset.
///
/// Fails with [`WorkToHomeError::MissingLocation`] before anything is
/// computed when either side is absent.
pub fn try_build_estimate(
    work: Option<&Coordinate>,
    target: Option<&Coordinate>,
    route_type: RouteType,
) -> Result<CommuteEstimate> {
    let work = work.ok_or_else(|| WorkToHomeError::missing_location("Work location not set"))?;
    let target =
        target.ok_or_else(|| WorkToHomeError::missing_location("Target location not set"))?;
    Ok(build_estimate(work, target, route_type))
}
