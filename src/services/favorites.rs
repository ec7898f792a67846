//! Saved listings with notes, priority and visit dates

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::models::favorite::validate_priority;
use crate::models::{Favorite, FavoriteId, FavoriteUpdate, Housing, HousingId, UserId};
use crate::repository::Repositories;
use crate::{Result, WorkToHomeError};

/// A favorite together with the listing it points at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavoriteWithHousing {
    pub favorite: Favorite,
    pub housing: Housing,
}

#[derive(Clone)]
pub struct FavoriteService {
    repos: Repositories,
    // serializes the duplicate check with the insert
    add_lock: Arc<Mutex<()>>,
}

impl FavoriteService {
    #[must_use]
    pub fn new(repos: Repositories) -> Self {
        Self {
            repos,
            add_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The user's favorites with their listings. Favorites whose listing has
    /// been removed are skipped.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: UserId) -> Result<Vec<FavoriteWithHousing>> {
        let mut result = Vec::new();
        for favorite in self.repos.favorites.list_favorites(user_id).await? {
            match self.repos.housing.get_housing(favorite.housing_id).await? {
                Some(housing) => result.push(FavoriteWithHousing { favorite, housing }),
                None => warn!("Favorite {} points at a missing listing", favorite.id),
            }
        }
        Ok(result)
    }

    #[instrument(skip(self, notes))]
    pub async fn add(
        &self,
        user_id: UserId,
        housing_id: HousingId,
        notes: Option<String>,
        priority: Option<u8>,
    ) -> Result<Favorite> {
        if let Some(priority) = priority {
            validate_priority(priority)?;
        }

        if self.repos.housing.get_housing(housing_id).await?.is_none() {
            return Err(WorkToHomeError::not_found("Housing"));
        }

        let _guard = self.add_lock.lock().await;
        if self
            .repos
            .favorites
            .find_favorite(user_id, housing_id)
            .await?
            .is_some()
        {
            return Err(WorkToHomeError::conflict("Already in favorites"));
        }

        let mut favorite = Favorite::new(user_id, housing_id);
        favorite.notes = notes;
        if let Some(priority) = priority {
            favorite.priority = priority;
        }
        self.repos.favorites.save_favorite(&favorite).await?;
        debug!("Added favorite {}", favorite.id);
        Ok(favorite)
    }

    /// Load a favorite owned by `user_id`. Other users' favorites look
    /// exactly like missing ones.
    async fn owned(&self, user_id: UserId, favorite_id: FavoriteId) -> Result<Favorite> {
        self.repos
            .favorites
            .get_favorite(favorite_id)
            .await?
            .filter(|favorite| favorite.user_id == user_id)
            .ok_or_else(|| WorkToHomeError::not_found("Favorite"))
    }

    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        user_id: UserId,
        favorite_id: FavoriteId,
        update: FavoriteUpdate,
    ) -> Result<Favorite> {
        let mut favorite = self.owned(user_id, favorite_id).await?;
        update.apply(&mut favorite)?;
        self.repos.favorites.save_favorite(&favorite).await?;
        Ok(favorite)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: UserId, favorite_id: FavoriteId) -> Result<()> {
        let favorite = self.owned(user_id, favorite_id).await?;
        if !self.repos.favorites.delete_favorite(favorite.id).await? {
            return Err(WorkToHomeError::not_found("Favorite"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;
    use crate::store::MemoryStore;
    use uuid::Uuid;

    async fn setup() -> (FavoriteService, Housing) {
        let repos = Repositories::from_store(Arc::new(MemoryStore::new()));
        let housing = Housing::new(
            "Park Slope brownstone",
            "7th Ave",
            "Brooklyn",
            "NY",
            "11215",
            Coordinate::new(40.6710, -73.9814),
            3500,
        );
        repos.housing.save_housing(&housing).await.unwrap();
        (FavoriteService::new(repos), housing)
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let (service, housing) = setup().await;
        let user_id = Uuid::new_v4();

        let favorite = service
            .add(user_id, housing.id, Some("great light".to_string()), Some(3))
            .await
            .unwrap();
        assert_eq!(favorite.priority, 3);

        let listed = service.list(user_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].favorite, favorite);
        assert_eq!(listed[0].housing, housing);

        assert!(service.list(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_favorite_conflicts() {
        let (service, housing) = setup().await;
        let user_id = Uuid::new_v4();
        service.add(user_id, housing.id, None, None).await.unwrap();

        let err = service.add(user_id, housing.id, None, None).await.unwrap_err();
        assert!(matches!(err, WorkToHomeError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_add_unknown_housing_or_bad_priority() {
        let (service, housing) = setup().await;
        let user_id = Uuid::new_v4();

        let err = service.add(user_id, Uuid::new_v4(), None, None).await.unwrap_err();
        assert!(matches!(err, WorkToHomeError::NotFound { .. }));

        let err = service.add(user_id, housing.id, None, Some(9)).await.unwrap_err();
        assert!(matches!(err, WorkToHomeError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_and_remove_are_owner_only() {
        let (service, housing) = setup().await;
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let favorite = service.add(owner, housing.id, None, None).await.unwrap();

        let update = FavoriteUpdate {
            priority: Some(5),
            ..Default::default()
        };
        let err = service
            .update(stranger, favorite.id, update.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkToHomeError::NotFound { .. }));

        let updated = service.update(owner, favorite.id, update).await.unwrap();
        assert_eq!(updated.priority, 5);

        assert!(service.remove(stranger, favorite.id).await.is_err());
        service.remove(owner, favorite.id).await.unwrap();
        assert!(service.remove(owner, favorite.id).await.is_err());
    }
}
