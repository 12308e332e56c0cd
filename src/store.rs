//! Store backend selection.

use shop_seeder_core::store::DocumentStore;

use crate::atlas_store::AtlasStore;
use crate::config::{self, StoreConfig};
use crate::error::{SeedError, SeedResult};
use crate::sqlite_store::SqliteStore;

/// Open the configured backend, bound to the configured collection.
///
/// A missing connection URI is a [`SeedError::Config`]; failing to open
/// the backend is a [`SeedError::Connectivity`]. No data is touched.
pub async fn connect_store(config: &StoreConfig) -> SeedResult<Box<dyn DocumentStore>> {
    match config.backend.as_str() {
        "mongodb" => {
            let uri = config::secret(&config.uri_env).map_err(SeedError::Config)?;
            let store = AtlasStore::connect(config, &uri)
                .await
                .map_err(SeedError::Connectivity)?;
            Ok(Box::new(store))
        }
        "sqlite" => {
            let store = SqliteStore::connect(config)
                .await
                .map_err(SeedError::Connectivity)?;
            Ok(Box::new(store))
        }
        other => Err(SeedError::Config(anyhow::anyhow!(
            "Unknown store backend: {}",
            other
        ))),
    }
}
