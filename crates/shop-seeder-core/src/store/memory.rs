//! In-memory [`DocumentStore`] implementation for tests and previews.
//!
//! Keeps documents as rendered JSON behind `std::sync::RwLock` and
//! journals every operation, so callers can assert on call order.
//! Failures can be injected per operation.

use std::collections::HashSet;
use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::models::{IndexedDocument, VectorIndex};

use super::DocumentStore;

/// One call made against an [`InMemoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Ping,
    IndexCheck,
    Clear,
    Insert,
    Close,
}

/// In-memory store with an operation journal.
pub struct InMemoryStore {
    docs: RwLock<Vec<Value>>,
    indexes: RwLock<HashSet<String>>,
    journal: RwLock<Vec<StoreOp>>,
    fail_ping: bool,
    fail_insert: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
            indexes: RwLock::new(HashSet::new()),
            journal: RwLock::new(Vec::new()),
            fail_ping: false,
            fail_insert: false,
        }
    }

    /// Pre-populate the collection.
    pub fn with_documents(self, docs: Vec<Value>) -> Self {
        *self.docs.write().unwrap() = docs;
        self
    }

    /// Register a vector index by name.
    pub fn with_index(self, name: &str) -> Self {
        self.indexes.write().unwrap().insert(name.to_string());
        self
    }

    /// Make every ping fail, as if the server were unreachable.
    pub fn unreachable(mut self) -> Self {
        self.fail_ping = true;
        self
    }

    /// Make every insert fail.
    pub fn failing_inserts(mut self) -> Self {
        self.fail_insert = true;
        self
    }

    /// Operations performed so far, in call order.
    pub fn journal(&self) -> Vec<StoreOp> {
        self.journal.read().unwrap().clone()
    }

    /// Documents currently in the collection.
    pub fn documents(&self) -> Vec<Value> {
        self.docs.read().unwrap().clone()
    }

    fn record(&self, op: StoreOp) {
        self.journal.write().unwrap().push(op);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn backend(&self) -> &str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        self.record(StoreOp::Ping);
        if self.fail_ping {
            bail!("server selection timed out");
        }
        Ok(())
    }

    async fn has_vector_index(&self, index: &VectorIndex) -> Result<bool> {
        self.record(StoreOp::IndexCheck);
        Ok(self.indexes.read().unwrap().contains(&index.name))
    }

    async fn clear(&self) -> Result<u64> {
        self.record(StoreOp::Clear);
        let mut docs = self.docs.write().unwrap();
        let removed = docs.len() as u64;
        docs.clear();
        Ok(removed)
    }

    async fn insert(&self, doc: &IndexedDocument, index: &VectorIndex) -> Result<String> {
        self.record(StoreOp::Insert);
        if self.fail_insert {
            bail!("write rejected");
        }
        let mut docs = self.docs.write().unwrap();
        docs.push(doc.to_json(index)?);
        Ok(format!("mem-{}", docs.len()))
    }

    async fn close(&self) {
        self.record(StoreOp::Close);
    }
}
