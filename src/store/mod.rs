//! Repository implementations

pub mod memory;
pub mod persistent;

use std::sync::Arc;

use tracing::info;

use crate::Result;
use crate::config::{StorageBackend, StorageConfig};
use crate::repository::Repositories;

pub use memory::MemoryStore;
pub use persistent::FjallStore;

/// Open the backend selected in the configuration
pub fn open(config: &StorageConfig) -> Result<Repositories> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage; records are not persisted");
            Ok(Repositories::from_store(Arc::new(MemoryStore::new())))
        }
        StorageBackend::Fjall => {
            let path = config.expanded_path();
            info!("Opening fjall storage at {}", path.display());
            Ok(Repositories::from_store(Arc::new(FjallStore::open(path)?)))
        }
    }
}
