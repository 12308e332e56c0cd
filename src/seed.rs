//! Seeding pipeline orchestration.
//!
//! One run moves strictly forward through
//! `Connected → Cleared → Generated → Summarized → Indexed` and then
//! closes the connection. Any failure skips the remaining steps, and the
//! connection is closed on every path.
//!
//! [`run_seed`] builds the providers and the store from configuration;
//! [`seed_collection`] is the pipeline itself, taking every collaborator
//! as an injected trait object.

use shop_seeder_core::embedding::Embedder;
use shop_seeder_core::generation::{generate_shop, ChatModel};
use shop_seeder_core::models::{IndexedDocument, ShopRecord, VectorIndex};
use shop_seeder_core::store::DocumentStore;
use shop_seeder_core::summary::shop_summary;

use crate::config::Config;
use crate::embedding;
use crate::error::{SeedError, SeedResult};
use crate::llm;
use crate::ping;
use crate::store;

/// Per-run settings the pipeline needs from configuration.
#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub index: VectorIndex,
    pub min_products: usize,
    pub require_index: bool,
}

impl SeedPlan {
    pub fn from_config(config: &Config) -> Self {
        Self {
            index: config.index.to_vector_index(),
            min_products: config.generation.min_products,
            require_index: config.store.require_index,
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct SeedReport {
    pub shop_name: String,
    pub products: usize,
    pub document_id: String,
    pub cleared: u64,
    pub dims: usize,
}

/// Run the full pipeline against the configured store and models.
///
/// Providers are constructed (and their secrets resolved) before the
/// store is opened, so a configuration error never touches the database.
pub async fn run_seed(config: &Config) -> SeedResult<SeedReport> {
    let chat = llm::create_chat_model(&config.generation).map_err(SeedError::Config)?;
    let embedder = embedding::create_embedder(&config.embedding).map_err(SeedError::Config)?;
    let store = store::connect_store(&config.store).await?;

    seed_and_close(
        store.as_ref(),
        chat.as_ref(),
        embedder.as_ref(),
        &SeedPlan::from_config(config),
    )
    .await
}

/// Run [`seed_collection`] and close `store` afterwards, whatever the
/// outcome.
pub async fn seed_and_close(
    store: &dyn DocumentStore,
    chat: &dyn ChatModel,
    embedder: &dyn Embedder,
    plan: &SeedPlan,
) -> SeedResult<SeedReport> {
    let result = seed_collection(store, chat, embedder, plan).await;
    store.close().await;
    tracing::debug!(backend = store.backend(), "connection closed");
    result
}

/// The seeding pipeline over injected collaborators.
///
/// Does not close `store`; see [`seed_and_close`].
pub async fn seed_collection(
    store: &dyn DocumentStore,
    chat: &dyn ChatModel,
    embedder: &dyn Embedder,
    plan: &SeedPlan,
) -> SeedResult<SeedReport> {
    ping::check_connectivity(store).await?;
    check_vector_index(store, &plan.index, plan.require_index).await?;

    let cleared = store
        .clear()
        .await
        .map_err(|e| SeedError::Store(e.context("failed to clear collection")))?;
    tracing::info!(cleared, "collection cleared");

    tracing::info!(model = chat.model_name(), "generating synthetic shop data");
    let shop = generate_shop(chat, plan.min_products).await?;

    let content = shop_summary(&shop);
    tracing::debug!(
        chars = content.len(),
        products = shop.products.len(),
        "summary built"
    );

    let shop_name = shop.name.clone();
    let products = shop.products.len();
    let (document_id, dims) = index_document(store, embedder, content, shop, &plan.index).await?;

    tracing::info!(
        shop = %shop_name,
        id = %document_id,
        "successfully processed and saved shop data"
    );

    Ok(SeedReport {
        shop_name,
        products,
        document_id,
        cleared,
        dims,
    })
}

/// Embed `content` and write it with `metadata` as one document.
///
/// Returns the new document id and the vector length. The vector must
/// have exactly the embedder's declared dimensionality.
pub async fn index_document(
    store: &dyn DocumentStore,
    embedder: &dyn Embedder,
    content: String,
    metadata: ShopRecord,
    index: &VectorIndex,
) -> SeedResult<(String, usize)> {
    let embedding = embedder.embed(&content).await.map_err(|e| {
        SeedError::Store(e.context(format!("embedding with {} failed", embedder.model_name())))
    })?;

    if embedding.len() != embedder.dims() {
        return Err(SeedError::Store(anyhow::anyhow!(
            "embedding has {} dimensions, expected {}",
            embedding.len(),
            embedder.dims()
        )));
    }

    let dims = embedding.len();
    let doc = IndexedDocument {
        content,
        embedding,
        metadata,
    };
    let id = store
        .insert(&doc, index)
        .await
        .map_err(|e| SeedError::Store(e.context("failed to insert document")))?;
    Ok((id, dims))
}

/// Check that the vector index exists before anything is modified.
///
/// Missing indexes (or backends that cannot list them) are only a warning
/// unless `required`.
async fn check_vector_index(
    store: &dyn DocumentStore,
    index: &VectorIndex,
    required: bool,
) -> SeedResult<()> {
    match store.has_vector_index(index).await {
        Ok(true) => {
            tracing::info!(index = %index.name, "vector index present");
            Ok(())
        }
        Ok(false) if required => Err(SeedError::Store(anyhow::anyhow!(
            "vector index '{}' does not exist on the target collection",
            index.name
        ))),
        Ok(false) => {
            tracing::warn!(
                index = %index.name,
                "vector index not found; documents will not be searchable until it is created"
            );
            Ok(())
        }
        Err(e) if required => Err(SeedError::Store(
            e.context(format!("could not verify vector index '{}'", index.name)),
        )),
        Err(e) => {
            tracing::warn!(index = %index.name, error = %format!("{:#}", e), "could not verify vector index");
            Ok(())
        }
    }
}

/// Generate and summarize a shop without touching the database or the
/// embedding model.
pub async fn run_preview(config: &Config) -> SeedResult<(ShopRecord, String)> {
    let chat = llm::create_chat_model(&config.generation).map_err(SeedError::Config)?;
    tracing::info!(model = chat.model_name(), "generating synthetic shop data");
    let shop = generate_shop(chat.as_ref(), config.generation.min_products).await?;
    let summary = shop_summary(&shop);
    Ok((shop, summary))
}
