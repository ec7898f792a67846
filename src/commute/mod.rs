//! Commute module
//!
//! The computational core of the service:
//! - Great-circle distance between a work location and a listing
//! - Linear duration and driving-cost estimates from that distance
//! - Bounding boxes to prefilter listings before exact distance ranking
//!
//! Everything here is pure and stateless, safe to call from any task.

pub mod estimator;
pub mod proximity;

pub use estimator::{
    CostBreakdown, EARTH_RADIUS_MILES, build_estimate, compute_distance, estimate_cost,
    estimate_duration, try_build_estimate,
};
pub use proximity::{BoundingBox, bounding_box};
