//! Commute calculation and history

use tracing::{debug, instrument};

use crate::commute::try_build_estimate;
use crate::models::{CommuteRecord, HousingId, RouteType, UserId};
use crate::repository::Repositories;
use crate::{Result, WorkToHomeError};

#[derive(Clone)]
pub struct CommuteService {
    repos: Repositories,
}

impl CommuteService {
    #[must_use]
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Estimate the commute from the user's work location to a listing and
    /// store it in the user's history.
    #[instrument(skip(self))]
    pub async fn calculate(
        &self,
        user_id: UserId,
        housing_id: HousingId,
        route_type: RouteType,
    ) -> Result<CommuteRecord> {
        let user = self
            .repos
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| WorkToHomeError::not_found("User"))?;

        if user.work_location.is_none() {
            return Err(WorkToHomeError::missing_location("Work location not set"));
        }

        let housing = self
            .repos
            .housing
            .get_housing(housing_id)
            .await?
            .ok_or_else(|| WorkToHomeError::not_found("Housing"))?;

        let estimate = try_build_estimate(
            user.work_location.as_ref(),
            Some(&housing.location),
            route_type,
        )?;
        debug!(
            "Estimated {:.2} miles / {} min to '{}'",
            estimate.distance_miles, estimate.duration_minutes, housing.title
        );

        let record = CommuteRecord::new(user_id, housing_id, estimate);
        self.repos.commutes.save(&record).await?;
        Ok(record)
    }

    /// Previously calculated commutes, newest first
    #[instrument(skip(self))]
    pub async fn history(&self, user_id: UserId) -> Result<Vec<CommuteRecord>> {
        self.repos.commutes.list_by_user(user_id).await
    }
}
