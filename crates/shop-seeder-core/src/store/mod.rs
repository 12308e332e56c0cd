//! Storage abstraction for the seeding pipeline.
//!
//! The [`DocumentStore`] trait is the whole database boundary the
//! pipeline needs: a liveness probe, an index presence check, a
//! full-collection clear, and a single insert. Backends (MongoDB Atlas,
//! SQLite, in-memory) bind a store instance to one target collection
//! when they are connected.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{IndexedDocument, VectorIndex};

/// Abstract document store bound to one collection.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`ping`](DocumentStore::ping) | Liveness command against the server |
/// | [`has_vector_index`](DocumentStore::has_vector_index) | Whether the named vector index exists |
/// | [`clear`](DocumentStore::clear) | Delete every document in the collection |
/// | [`insert`](DocumentStore::insert) | Write one document in the index's field layout |
/// | [`close`](DocumentStore::close) | Release the connection |
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend label for logs (e.g. `"mongodb"`).
    fn backend(&self) -> &str;

    /// Issue a liveness command.
    async fn ping(&self) -> Result<()>;

    /// Report whether `index` exists on the bound collection.
    ///
    /// Never creates the index.
    async fn has_vector_index(&self, index: &VectorIndex) -> Result<bool>;

    /// Delete all documents in the bound collection. Returns the number
    /// of documents removed.
    async fn clear(&self) -> Result<u64>;

    /// Insert one document, laid out per `index`. Returns the new
    /// document's id.
    async fn insert(&self, doc: &IndexedDocument, index: &VectorIndex) -> Result<String>;

    /// Release the underlying connection.
    async fn close(&self);
}
