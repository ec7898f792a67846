//! `WorkToHome` - housing search with commute estimation
//!
//! This library provides commute estimation from a user's work location to
//! housing listings, bounding-box prefiltering for nearby search, and the
//! storage, service and HTTP layers around them.

pub mod api;
pub mod auth;
pub mod commute;
pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod repository;
pub mod services;
pub mod store;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use commute::{BoundingBox, bounding_box, build_estimate, compute_distance};
pub use config::WorkToHomeConfig;
pub use error::WorkToHomeError;
pub use models::{CommuteEstimate, Coordinate, RouteType};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WorkToHomeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
