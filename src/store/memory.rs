//! In-process store backed by hash maps

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::models::{
    CommuteId, CommuteRecord, Favorite, FavoriteId, Housing, HousingId, User, UserId,
};
use crate::repository::{
    CommuteRepository, FavoriteRepository, HousingRepository, UserRepository,
};

/// Keeps every record in memory. Contents are lost on shutdown.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    housing: RwLock<HashMap<HousingId, Housing>>,
    commutes: RwLock<HashMap<CommuteId, CommuteRecord>>,
    favorites: RwLock<HashMap<FavoriteId, Favorite>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }
}

#[async_trait]
impl HousingRepository for MemoryStore {
    async fn get_housing(&self, id: HousingId) -> Result<Option<Housing>> {
        Ok(self.housing.read().await.get(&id).cloned())
    }

    async fn save_housing(&self, housing: &Housing) -> Result<()> {
        self.housing.write().await.insert(housing.id, housing.clone());
        Ok(())
    }

    async fn list_housing(&self) -> Result<Vec<Housing>> {
        let mut listings: Vec<Housing> = self.housing.read().await.values().cloned().collect();
        listings.sort_by_key(|h| (h.created_at, h.id));
        Ok(listings)
    }
}

#[async_trait]
impl CommuteRepository for MemoryStore {
    async fn save(&self, record: &CommuteRecord) -> Result<CommuteId> {
        self.commutes.write().await.insert(record.id, record.clone());
        Ok(record.id)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<CommuteRecord>> {
        let mut records: Vec<CommuteRecord> = self
            .commutes
            .read()
            .await
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.calculated_at.cmp(&a.calculated_at));
        Ok(records)
    }
}

#[async_trait]
impl FavoriteRepository for MemoryStore {
    async fn get_favorite(&self, id: FavoriteId) -> Result<Option<Favorite>> {
        Ok(self.favorites.read().await.get(&id).cloned())
    }

    async fn find_favorite(
        &self,
        user_id: UserId,
        housing_id: HousingId,
    ) -> Result<Option<Favorite>> {
        Ok(self
            .favorites
            .read()
            .await
            .values()
            .find(|f| f.user_id == user_id && f.housing_id == housing_id)
            .cloned())
    }

    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<Favorite>> {
        let mut favorites: Vec<Favorite> = self
            .favorites
            .read()
            .await
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        favorites.sort_by_key(|f| f.created_at);
        Ok(favorites)
    }

    async fn save_favorite(&self, favorite: &Favorite) -> Result<()> {
        self.favorites
            .write()
            .await
            .insert(favorite.id, favorite.clone());
        Ok(())
    }

    async fn delete_favorite(&self, id: FavoriteId) -> Result<bool> {
        Ok(self.favorites.write().await.remove(&id).is_some())
    }
}
