//! SQLite schema setup and vector index registration (`shop-seed init`).
//!
//! The seeding run never creates indexes. For the SQLite backend, `init`
//! plays the role of the external index manager: it creates the tables
//! and records the configured index in `vector_indexes`.

use anyhow::{bail, Result};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    if config.store.backend != "sqlite" {
        bail!(
            "init manages the sqlite backend only; the '{}' backend's vector index is managed by the database service",
            config.store.backend
        );
    }

    let pool = db::connect(&config.store).await?;
    let result = migrate_and_register(&pool, config).await;
    pool.close().await;
    result
}

async fn migrate_and_register(pool: &SqlitePool, config: &Config) -> Result<()> {
    create_schema(pool).await?;
    register_index(pool, config).await?;
    tracing::info!(
        path = %config.store.path.display(),
        collection = %config.store.collection,
        index = %config.index.name,
        "database initialized"
    );
    Ok(())
}

pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // Create documents table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            collection TEXT NOT NULL,
            document_json TEXT NOT NULL,
            embedding BLOB NOT NULL,
            dims INTEGER NOT NULL,
            content_hash TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create vector index registry
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vector_indexes (
            collection TEXT NOT NULL,
            name TEXT NOT NULL,
            text_key TEXT NOT NULL,
            embedding_key TEXT NOT NULL,
            dims INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            PRIMARY KEY (collection, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn register_index(pool: &SqlitePool, config: &Config) -> Result<()> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO vector_indexes (collection, name, text_key, embedding_key, dims, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(collection, name) DO UPDATE SET
            text_key = excluded.text_key,
            embedding_key = excluded.embedding_key,
            dims = excluded.dims
        "#,
    )
    .bind(&config.store.collection)
    .bind(&config.index.name)
    .bind(&config.index.text_key)
    .bind(&config.index.embedding_key)
    .bind(config.embedding.dims as i64)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}
