//! MongoDB Atlas [`DocumentStore`] implementation.
//!
//! Documents are written in the Atlas Vector Search layout: the summary
//! under the index's text key, the vector under its embedding key, and
//! the shop fields spread at the top level. The search index itself is
//! created in Atlas, never here.

use anyhow::{Context, Result};
use async_trait::async_trait;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::{Client, Collection};

use shop_seeder_core::models::{IndexedDocument, VectorIndex};
use shop_seeder_core::store::DocumentStore;

use crate::config::StoreConfig;

pub struct AtlasStore {
    client: Client,
    collection: Collection<Document>,
}

impl AtlasStore {
    /// Build a client for `uri` bound to the configured collection.
    ///
    /// The driver connects lazily; reachability is established by
    /// [`ping`](DocumentStore::ping).
    pub async fn connect(config: &StoreConfig, uri: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .context("invalid MongoDB connection string")?;
        let collection = client
            .database(&config.database)
            .collection::<Document>(&config.collection);
        Ok(Self { client, collection })
    }
}

#[async_trait]
impl DocumentStore for AtlasStore {
    fn backend(&self) -> &str {
        "mongodb"
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .context("ping command failed")?;
        Ok(())
    }

    async fn has_vector_index(&self, index: &VectorIndex) -> Result<bool> {
        let pipeline = vec![doc! { "$listSearchIndexes": { "name": index.name.as_str() } }];
        let mut cursor = self
            .collection
            .aggregate(pipeline)
            .await
            .context("$listSearchIndexes is not available on this deployment")?;
        Ok(cursor.advance().await?)
    }

    async fn clear(&self) -> Result<u64> {
        let result = self.collection.delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }

    async fn insert(&self, doc: &IndexedDocument, index: &VectorIndex) -> Result<String> {
        let document = bson::to_document(&doc.to_json(index)?)
            .context("failed to encode document as BSON")?;
        let result = self.collection.insert_one(document).await?;
        Ok(match result.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            other => other.to_string(),
        })
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}
