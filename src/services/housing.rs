//! Listing search, lookup and nearby ranking

use serde::Serialize;
use tracing::{debug, instrument};

use super::{Page, PageRequest};
use crate::commute::{bounding_box, compute_distance};
use crate::config::SearchConfig;
use crate::models::{Housing, HousingFilter, HousingId, User, UserId};
use crate::repository::Repositories;
use crate::{Result, WorkToHomeError};

/// Largest radius a nearby search accepts
pub const MAX_RADIUS_MILES: f64 = 500.0;

/// A listing with its great-circle distance from the user's work location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyHousing {
    pub housing: Housing,
    pub distance_miles: f64,
}

#[derive(Clone)]
pub struct HousingService {
    repos: Repositories,
    search: SearchConfig,
}

impl HousingService {
    #[must_use]
    pub fn new(repos: Repositories, search: SearchConfig) -> Self {
        Self { repos, search }
    }

    async fn user(&self, user_id: UserId) -> Result<User> {
        self.repos
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| WorkToHomeError::not_found("User"))
    }

    /// Filtered listings, further narrowed to the user's budget
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        user_id: UserId,
        filter: &HousingFilter,
        page: PageRequest,
    ) -> Result<Page<Housing>> {
        let user = self.user(user_id).await?;
        let (page, per_page) = page.resolve(&self.search);

        let matches: Vec<Housing> = self
            .repos
            .housing
            .list_housing()
            .await?
            .into_iter()
            .filter(|housing| filter.matches(housing) && user.within_budget(housing.price))
            .collect();
        debug!("{} listings match search", matches.len());

        Ok(Page::paginate(matches, page, per_page))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, housing_id: HousingId) -> Result<Housing> {
        self.repos
            .housing
            .get_housing(housing_id)
            .await?
            .ok_or_else(|| WorkToHomeError::not_found("Housing"))
    }

    /// Listings within `radius_miles` of the user's work location, closest
    /// first.
    ///
    /// The bounding box scopes the storage query; the exact radius is then
    /// enforced with the great-circle distance.
    #[instrument(skip(self))]
    pub async fn nearby(
        &self,
        user_id: UserId,
        radius_miles: Option<f64>,
        page: PageRequest,
    ) -> Result<Page<NearbyHousing>> {
        let user = self.user(user_id).await?;
        let work = user
            .work_location
            .ok_or_else(|| WorkToHomeError::missing_location("Work location not set"))?;

        let radius = radius_miles.unwrap_or(self.search.default_radius_miles);
        if !(radius > 0.0 && radius <= MAX_RADIUS_MILES) {
            return Err(WorkToHomeError::validation(format!(
                "Radius must be greater than 0 and at most {MAX_RADIUS_MILES} miles"
            )));
        }
        let (page, per_page) = page.resolve(&self.search);

        let bbox = bounding_box(&work, radius);
        let candidates = self.repos.housing.housing_in_box(&bbox).await?;
        let prefiltered = candidates.len();

        let mut nearby: Vec<NearbyHousing> = candidates
            .into_iter()
            .filter(|housing| user.within_budget(housing.price))
            .map(|housing| NearbyHousing {
                distance_miles: compute_distance(&work, &housing.location),
                housing,
            })
            .filter(|candidate| candidate.distance_miles <= radius)
            .collect();
        nearby.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));

        debug!(
            "{} listings in bounding box, {} within {radius} miles",
            prefiltered,
            nearby.len()
        );

        Ok(Page::paginate(nearby, page, per_page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    const WORK: Coordinate = Coordinate::new(40.7128, -74.0060);

    fn listing(title: &str, location: Coordinate, price: u32) -> Housing {
        Housing::new(title, "1 Test St", "New York", "NY", "10001", location, price)
    }

    async fn setup(user: User) -> (HousingService, User) {
        let repos = Repositories::from_store(Arc::new(MemoryStore::new()));
        repos.users.save_user(&user).await.unwrap();

        let listings = [
            listing("Tribeca", Coordinate::new(40.7163, -74.0086), 4200),
            listing("Williamsburg", Coordinate::new(40.7306, -73.9352), 2800),
            listing("Hoboken", Coordinate::new(40.7440, -74.0324), 2500),
            // inside the box corner but outside the 5 mile circle
            listing("Corner", Coordinate::new(40.7128 + 0.065, -74.0060 + 0.085), 2000),
            listing("Philadelphia", Coordinate::new(39.9526, -75.1652), 1500),
        ];
        for housing in &listings {
            repos.housing.save_housing(housing).await.unwrap();
        }

        (HousingService::new(repos, SearchConfig::default()), user)
    }

    fn commuter() -> User {
        let mut user = User::new("nyc@example.com", "nyc");
        user.work_location = Some(WORK);
        user
    }

    #[tokio::test]
    async fn test_nearby_ranks_by_distance_within_radius() {
        let (service, user) = setup(commuter()).await;

        let page = service
            .nearby(user.id, Some(5.0), PageRequest::default())
            .await
            .unwrap();

        let titles: Vec<&str> = page.items.iter().map(|n| n.housing.title.as_str()).collect();
        assert_eq!(titles, vec!["Tribeca", "Hoboken", "Williamsburg"]);
        assert!(page.items.iter().all(|n| n.distance_miles <= 5.0));
        assert!(
            page.items
                .windows(2)
                .all(|w| w[0].distance_miles <= w[1].distance_miles)
        );
    }

    #[tokio::test]
    async fn test_nearby_applies_budget() {
        let mut user = commuter();
        user.budget_max = Some(3000);
        let (service, user) = setup(user).await;

        let page = service
            .nearby(user.id, Some(5.0), PageRequest::default())
            .await
            .unwrap();
        let titles: Vec<&str> = page.items.iter().map(|n| n.housing.title.as_str()).collect();
        assert_eq!(titles, vec!["Hoboken", "Williamsburg"]);
    }

    #[tokio::test]
    async fn test_nearby_default_radius_and_pagination() {
        let (service, user) = setup(commuter()).await;

        let page = service
            .nearby(
                user.id,
                None,
                PageRequest {
                    page: Some(2),
                    per_page: Some(2),
                },
            )
            .await
            .unwrap();

        // Tribeca, Hoboken, Williamsburg, Corner within 10 miles
        assert_eq!(page.total, 4);
        assert_eq!(page.items.len(), 2);
        assert!(page.has_prev);
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn test_nearby_requires_work_location() {
        let (service, user) = setup(User::new("nowork@example.com", "nowork")).await;
        let err = service
            .nearby(user.id, Some(5.0), PageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkToHomeError::MissingLocation { .. }));
    }

    #[tokio::test]
    async fn test_nearby_rejects_bad_radius() {
        let (service, user) = setup(commuter()).await;
        for radius in [0.0, -3.0, 501.0, f64::NAN] {
            let err = service
                .nearby(user.id, Some(radius), PageRequest::default())
                .await
                .unwrap_err();
            assert!(matches!(err, WorkToHomeError::Validation { .. }));
        }
    }

    #[tokio::test]
    async fn test_search_filters_and_budget() {
        let mut user = commuter();
        user.budget_min = Some(2000);
        let (service, user) = setup(user).await;

        let filter = HousingFilter {
            max_price: Some(3000),
            ..Default::default()
        };
        let page = service
            .search(user.id, &filter, PageRequest::default())
            .await
            .unwrap();

        let mut titles: Vec<&str> = page.items.iter().map(|h| h.title.as_str()).collect();
        titles.sort_unstable();
        assert_eq!(titles, vec!["Corner", "Hoboken", "Williamsburg"]);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn test_get_unknown_housing() {
        let (service, _user) = setup(commuter()).await;
        let err = service.get(uuid::Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, WorkToHomeError::NotFound { .. }));
    }
}
