//! Data models for the WorkToHome application
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates
//! - Commute: Estimates and stored commute history
//! - Housing: Listings and search filters
//! - Favorite: Saved listings with notes and priority
//! - User: Work location and search preferences

pub mod commute;
pub mod favorite;
pub mod housing;
pub mod location;
pub mod user;

// Re-export all public types for convenient access
pub use commute::{CommuteEstimate, CommuteId, CommuteRecord, RouteType};
pub use favorite::{Favorite, FavoriteId, FavoriteUpdate};
pub use housing::{Housing, HousingFilter, HousingId};
pub use location::Coordinate;
pub use user::{ProfileUpdate, User, UserId};
