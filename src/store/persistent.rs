//! Persistent store on a fjall keyspace
//!
//! Records are postcard-encoded under `<kind>:<id>` keys. Per-user lists and
//! the listing catalogue are kept as id index entries next to the records, so
//! every lookup is a point read. A record and its index entry are committed
//! in one batch.

use std::path::Path;

use async_trait::async_trait;
use fjall::{Database, Keyspace};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;
use tokio::task;
use uuid::Uuid;

use crate::Result;
use crate::models::{
    CommuteId, CommuteRecord, Favorite, FavoriteId, Housing, HousingId, User, UserId,
};
use crate::repository::{
    CommuteRepository, FavoriteRepository, HousingRepository, UserRepository,
};

const HOUSING_INDEX: &str = "index:housing";

pub struct FjallStore {
    db: Database,
    store: Keyspace,
    // index entries are read-modify-write
    write_lock: Mutex<()>,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

fn user_key(id: UserId) -> String {
    format!("user:{id}")
}

fn housing_key(id: HousingId) -> String {
    format!("housing:{id}")
}

fn commute_key(id: CommuteId) -> String {
    format!("commute:{id}")
}

fn favorite_key(id: FavoriteId) -> String {
    format!("favorite:{id}")
}

fn commute_index_key(user_id: UserId) -> String {
    format!("index:commutes:{user_id}")
}

fn favorite_index_key(user_id: UserId) -> String {
    format!("index:favorites:{user_id}")
}

impl FjallStore {
    /// Open (or create) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let items = db.keyspace("records", fjall::KeyspaceCreateOptions::default)?;
        Ok(FjallStore {
            db,
            store: items,
            write_lock: Mutex::new(()),
        })
    }

    #[tracing::instrument(name = "store_put", level = "debug", skip(self, value))]
    async fn put<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let bytes = postcard::to_stdvec(value)?;

        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        Ok(())
    }

    /// Apply inserts (`Some`) and removals (`None`) atomically
    #[tracing::instrument(name = "store_batch", level = "debug", skip_all, fields(len = writes.len()))]
    async fn write_batch(&self, writes: Vec<(String, Option<Vec<u8>>)>) -> Result<()> {
        let db = self.db.clone();
        let store = self.store.clone();

        task::spawn_blocking(move || {
            let mut batch = db.batch();
            for (key, value) in writes {
                match value {
                    Some(bytes) => batch.insert(&store, key.into_bytes(), bytes),
                    None => batch.remove(&store, key.into_bytes()),
                }
            }
            batch.commit()
        })
        .await??;
        Ok(())
    }

    /// Store `record` under `key` and add `id` to `index_key` in one batch.
    /// Callers hold `write_lock`.
    async fn put_indexed<T: Serialize + Sync>(
        &self,
        key: String,
        record: &T,
        index_key: &str,
        id: Uuid,
    ) -> Result<()> {
        let mut writes = vec![(key, Some(postcard::to_stdvec(record)?))];
        let mut ids = self.index(index_key).await?;
        if !ids.contains(&id) {
            ids.push(id);
            writes.push((index_key.to_string(), Some(postcard::to_stdvec(&ids)?)));
        }
        self.write_batch(writes).await
    }

    #[tracing::instrument(name = "store_get", level = "debug", skip(self))]
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes = task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        match maybe_bytes {
            Some(bytes) => Ok(Some(postcard::from_bytes(&bytes)?)),
            None => {
                tracing::debug!("Key not found");
                Ok(None)
            }
        }
    }

    async fn index(&self, key: &str) -> Result<Vec<Uuid>> {
        Ok(self.get::<Vec<Uuid>>(key).await?.unwrap_or_default())
    }

    /// Load every record an index entry points at, skipping dangling ids
    async fn load_indexed<T: DeserializeOwned + Send>(
        &self,
        index_key: &str,
        record_key: fn(Uuid) -> String,
    ) -> Result<Vec<T>> {
        let mut records = Vec::new();
        for id in self.index(index_key).await? {
            if let Some(record) = self.get::<T>(&record_key(id)).await? {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl UserRepository for FjallStore {
    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.get(&user_key(id)).await
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        self.put(&user_key(user.id), user).await
    }
}

#[async_trait]
impl HousingRepository for FjallStore {
    async fn get_housing(&self, id: HousingId) -> Result<Option<Housing>> {
        self.get(&housing_key(id)).await
    }

    async fn save_housing(&self, housing: &Housing) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.put_indexed(housing_key(housing.id), housing, HOUSING_INDEX, housing.id)
            .await
    }

    async fn list_housing(&self) -> Result<Vec<Housing>> {
        self.load_indexed(HOUSING_INDEX, housing_key).await
    }
}

#[async_trait]
impl CommuteRepository for FjallStore {
    async fn save(&self, record: &CommuteRecord) -> Result<CommuteId> {
        let _guard = self.write_lock.lock().await;
        self.put_indexed(
            commute_key(record.id),
            record,
            &commute_index_key(record.user_id),
            record.id,
        )
        .await?;
        Ok(record.id)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<CommuteRecord>> {
        let mut records: Vec<CommuteRecord> = self
            .load_indexed(&commute_index_key(user_id), commute_key)
            .await?;
        records.sort_by(|a, b| b.calculated_at.cmp(&a.calculated_at));
        Ok(records)
    }
}

#[async_trait]
impl FavoriteRepository for FjallStore {
    async fn get_favorite(&self, id: FavoriteId) -> Result<Option<Favorite>> {
        self.get(&favorite_key(id)).await
    }

    async fn find_favorite(
        &self,
        user_id: UserId,
        housing_id: HousingId,
    ) -> Result<Option<Favorite>> {
        Ok(self
            .list_favorites(user_id)
            .await?
            .into_iter()
            .find(|f| f.housing_id == housing_id))
    }

    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<Favorite>> {
        let mut favorites: Vec<Favorite> = self
            .load_indexed(&favorite_index_key(user_id), favorite_key)
            .await?;
        favorites.sort_by_key(|f| f.created_at);
        Ok(favorites)
    }

    async fn save_favorite(&self, favorite: &Favorite) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.put_indexed(
            favorite_key(favorite.id),
            favorite,
            &favorite_index_key(favorite.user_id),
            favorite.id,
        )
        .await
    }

    async fn delete_favorite(&self, id: FavoriteId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let Some(favorite) = self.get::<Favorite>(&favorite_key(id)).await? else {
            return Ok(false);
        };

        let index_key = favorite_index_key(favorite.user_id);
        let mut ids = self.index(&index_key).await?;
        ids.retain(|existing| *existing != id);
        self.write_batch(vec![
            (index_key, Some(postcard::to_stdvec(&ids)?)),
            (favorite_key(id), None),
        ])
        .await?;
        Ok(true)
    }
}
