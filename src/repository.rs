//! Storage interfaces for users, listings, favorites and commute history
//!
//! Services only see these traits; `store` provides the in-memory and fjall
//! backed implementations.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::commute::BoundingBox;
use crate::models::{
    CommuteId, CommuteRecord, Favorite, FavoriteId, Housing, HousingId, User, UserId,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Insert or replace a user
    async fn save_user(&self, user: &User) -> Result<()>;
}

#[async_trait]
pub trait HousingRepository: Send + Sync {
    async fn get_housing(&self, id: HousingId) -> Result<Option<Housing>>;

    /// Insert or replace a listing
    async fn save_housing(&self, housing: &Housing) -> Result<()>;

    async fn list_housing(&self) -> Result<Vec<Housing>>;

    /// Listings whose coordinate falls inside `bbox`
    async fn housing_in_box(&self, bbox: &BoundingBox) -> Result<Vec<Housing>> {
        Ok(self
            .list_housing()
            .await?
            .into_iter()
            .filter(|housing| bbox.contains(&housing.location))
            .collect())
    }
}

#[async_trait]
pub trait CommuteRepository: Send + Sync {
    /// Persist a computed estimate, returning its id
    async fn save(&self, record: &CommuteRecord) -> Result<CommuteId>;

    /// A user's commute history, newest first
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<CommuteRecord>>;
}

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    async fn get_favorite(&self, id: FavoriteId) -> Result<Option<Favorite>>;

    async fn find_favorite(
        &self,
        user_id: UserId,
        housing_id: HousingId,
    ) -> Result<Option<Favorite>>;

    /// A user's favorites, oldest first
    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<Favorite>>;

    /// Insert or replace a favorite
    async fn save_favorite(&self, favorite: &Favorite) -> Result<()>;

    /// Returns whether anything was removed
    async fn delete_favorite(&self, id: FavoriteId) -> Result<bool>;
}

/// The set of repositories the services are wired with
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub housing: Arc<dyn HousingRepository>,
    pub commutes: Arc<dyn CommuteRepository>,
    pub favorites: Arc<dyn FavoriteRepository>,
}

impl Repositories {
    /// Use one backend for every record kind
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + HousingRepository + CommuteRepository + FavoriteRepository + 'static,
    {
        Self {
            users: store.clone(),
            housing: store.clone(),
            commutes: store.clone(),
            favorites: store,
        }
    }
}
