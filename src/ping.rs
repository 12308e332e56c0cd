//! Connectivity check: the gate in front of every write, and the
//! standalone `shop-seed ping` command.

use shop_seeder_core::store::DocumentStore;

use crate::config::Config;
use crate::error::{SeedError, SeedResult};
use crate::store;

/// Issue the liveness command; failure is a [`SeedError::Connectivity`].
pub async fn check_connectivity(store: &dyn DocumentStore) -> SeedResult<()> {
    store.ping().await.map_err(SeedError::Connectivity)?;
    tracing::info!(
        backend = store.backend(),
        "pinged deployment, successfully connected"
    );
    Ok(())
}

/// Connect, ping, and close.
pub async fn run_ping(config: &Config) -> SeedResult<()> {
    let store = store::connect_store(&config.store).await?;
    let result = check_connectivity(store.as_ref()).await;
    store.close().await;
    result
}
