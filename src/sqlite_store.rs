//! SQLite-backed [`DocumentStore`] implementation.
//!
//! A "collection" is the set of `documents` rows sharing a `collection`
//! value. Each row holds the rendered document JSON (text field, vector
//! field and spread metadata, exactly as a document database would see
//! it), plus the vector as a little-endian f32 BLOB and a SHA-256 hash of
//! the content. Vector indexes are rows in `vector_indexes`, written only
//! by `shop-seed init`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

use shop_seeder_core::embedding::vec_to_blob;
use shop_seeder_core::models::{IndexedDocument, VectorIndex};
use shop_seeder_core::store::DocumentStore;

use crate::config::StoreConfig;
use crate::db;
use crate::migrate;

/// SQLite implementation of the [`DocumentStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
    collection: String,
}

impl SqliteStore {
    /// Open the database file and make sure the tables exist.
    ///
    /// Like a document database creating a collection on first write,
    /// this creates tables but never registers a vector index.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let pool = db::connect(config)
            .await
            .with_context(|| format!("failed to open {}", config.path.display()))?;
        migrate::create_schema(&pool).await?;
        Ok(Self {
            pool,
            collection: config.collection.clone(),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    fn backend(&self) -> &str {
        "sqlite"
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// An index registered under the same name over different text or
    /// vector fields does not count. Dimensions are not compared here; the
    /// pipeline checks each vector against `embedding.dims` before writing.
    async fn has_vector_index(&self, index: &VectorIndex) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) > 0 FROM vector_indexes
            WHERE collection = ? AND name = ? AND text_key = ? AND embedding_key = ?
            "#,
        )
        .bind(&self.collection)
        .bind(&index.name)
        .bind(&index.text_key)
        .bind(&index.embedding_key)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ?")
            .bind(&self.collection)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert(&self, doc: &IndexedDocument, index: &VectorIndex) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let document_json = doc.to_json(index)?.to_string();
        let blob = vec_to_blob(&doc.embedding);
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO documents (id, collection, document_json, embedding, dims, content_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&self.collection)
        .bind(&document_json)
        .bind(&blob)
        .bind(doc.embedding.len() as i64)
        .bind(hash_text(&doc.content))
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
