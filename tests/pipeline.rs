//! End-to-end pipeline tests over the in-memory store and scripted models.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use shop_seeder::error::SeedError;
use shop_seeder::seed::{seed_and_close, seed_collection, SeedPlan};
use shop_seeder_core::embedding::Embedder;
use shop_seeder_core::generation::ChatModel;
use shop_seeder_core::models::VectorIndex;
use shop_seeder_core::schema::parse_shop;
use shop_seeder_core::store::memory::{InMemoryStore, StoreOp};
use shop_seeder_core::summary::shop_summary;

// ============ Test doubles ============

struct ScriptedChat {
    reply: String,
}

#[async_trait]
impl ChatModel for ScriptedChat {
    fn model_name(&self) -> &str {
        "scripted-chat"
    }

    async fn invoke(&self, _prompt: &str) -> Result<String> {
        Ok(self.reply.clone())
    }
}

struct FixedEmbedder {
    declared_dims: usize,
    vector: Vec<f32>,
    calls: AtomicUsize,
}

impl FixedEmbedder {
    fn new(vector: Vec<f32>) -> Self {
        Self {
            declared_dims: vector.len(),
            vector,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    fn model_name(&self) -> &str {
        "fixed-embedder"
    }

    fn dims(&self) -> usize {
        self.declared_dims
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vector.clone())
    }
}

fn shop_json(price: serde_json::Value) -> String {
    json!({
        "name": "Harbor Greens",
        "owner": "Maya Ortiz",
        "location": {
            "latitude": 47.6062,
            "longitude": -122.3321,
            "address": "210 Pike St, Seattle, WA"
        },
        "rating": 4.6,
        "products": [
            { "name": "Honeycrisp Apple", "category": "fruit", "price": 1.25, "stock": 120, "imageUrl": "https://img.example.com/apple.png" },
            { "name": "Sourdough Loaf", "category": "bakery", "price": price, "stock": 15, "imageUrl": "https://img.example.com/bread.png" }
        ]
    })
    .to_string()
}

fn valid_reply() -> String {
    format!("```json\n{}\n```", shop_json(json!(5.5)))
}

fn plan(require_index: bool) -> SeedPlan {
    SeedPlan {
        index: VectorIndex::default(),
        min_products: 10,
        require_index,
    }
}

// ============ Tests ============

#[tokio::test]
async fn test_seed_replaces_collection_with_one_document() {
    let store = InMemoryStore::new()
        .with_index("vector_index")
        .with_documents(vec![json!({"name": "stale"}), json!({"name": "older"})]);
    let chat = ScriptedChat {
        reply: valid_reply(),
    };
    let embedder = FixedEmbedder::new(vec![0.1, 0.2, 0.3]);

    let report = seed_collection(&store, &chat, &embedder, &plan(false))
        .await
        .unwrap();

    assert_eq!(report.shop_name, "Harbor Greens");
    assert_eq!(report.products, 2);
    assert_eq!(report.cleared, 2);
    assert_eq!(report.dims, 3);
    assert_eq!(report.document_id, "mem-1");
    assert_eq!(
        store.journal(),
        vec![StoreOp::Ping, StoreOp::IndexCheck, StoreOp::Clear, StoreOp::Insert]
    );

    let docs = store.documents();
    assert_eq!(docs.len(), 1);
    let doc = &docs[0];
    assert_eq!(doc["name"], "Harbor Greens");
    assert_eq!(doc["owner"], "Maya Ortiz");
    assert_eq!(doc["location"]["address"], "210 Pike St, Seattle, WA");
    assert_eq!(doc["products"][1]["imageUrl"], "https://img.example.com/bread.png");
    assert_eq!(doc["embedding"].as_array().unwrap().len(), 3);

    let expected = shop_summary(&parse_shop(&valid_reply()).unwrap());
    assert_eq!(doc["embedding_text"], expected.as_str());
    assert_eq!(embedder.calls(), 1);
}

#[tokio::test]
async fn test_unreachable_store_modifies_nothing() {
    let store = InMemoryStore::new()
        .unreachable()
        .with_documents(vec![json!({"name": "keep me"})]);
    let chat = ScriptedChat {
        reply: valid_reply(),
    };
    let embedder = FixedEmbedder::new(vec![0.1]);

    let err = seed_collection(&store, &chat, &embedder, &plan(false))
        .await
        .unwrap_err();

    assert!(matches!(err, SeedError::Connectivity(_)));
    assert_eq!(store.journal(), vec![StoreOp::Ping]);
    assert_eq!(store.documents().len(), 1);
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn test_rejected_output_leaves_collection_cleared() {
    let store = InMemoryStore::new()
        .with_index("vector_index")
        .with_documents(vec![json!({"name": "stale"})]);
    let chat = ScriptedChat {
        reply: shop_json(json!("cheap")),
    };
    let embedder = FixedEmbedder::new(vec![0.1]);

    let err = seed_collection(&store, &chat, &embedder, &plan(false))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "generation");
    assert_eq!(
        store.journal(),
        vec![StoreOp::Ping, StoreOp::IndexCheck, StoreOp::Clear]
    );
    assert!(store.documents().is_empty());
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn test_negative_price_is_rejected() {
    let store = InMemoryStore::new();
    let chat = ScriptedChat {
        reply: shop_json(json!(-2.0)),
    };
    let embedder = FixedEmbedder::new(vec![0.1]);

    let err = seed_collection(&store, &chat, &embedder, &plan(false))
        .await
        .unwrap_err();

    assert!(matches!(err, SeedError::Generation(_)));
    assert!(err.to_string().contains("products[1].price"));
}

#[tokio::test]
async fn test_missing_index_warns_by_default() {
    let store = InMemoryStore::new();
    let chat = ScriptedChat {
        reply: valid_reply(),
    };
    let embedder = FixedEmbedder::new(vec![0.5, 0.5]);

    let report = seed_collection(&store, &chat, &embedder, &plan(false))
        .await
        .unwrap();

    assert_eq!(report.cleared, 0);
    assert_eq!(store.documents().len(), 1);
}

#[tokio::test]
async fn test_required_index_missing_aborts_before_clear() {
    let store = InMemoryStore::new().with_documents(vec![json!({"name": "keep me"})]);
    let chat = ScriptedChat {
        reply: valid_reply(),
    };
    let embedder = FixedEmbedder::new(vec![0.1]);

    let err = seed_collection(&store, &chat, &embedder, &plan(true))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "store");
    assert!(err.to_string().contains("vector_index"));
    assert_eq!(store.journal(), vec![StoreOp::Ping, StoreOp::IndexCheck]);
    assert_eq!(store.documents().len(), 1);
}

#[tokio::test]
async fn test_dimension_mismatch_is_store_error() {
    let store = InMemoryStore::new().with_index("vector_index");
    let chat = ScriptedChat {
        reply: valid_reply(),
    };
    let mut embedder = FixedEmbedder::new(vec![0.1, 0.2]);
    embedder.declared_dims = 768;

    let err = seed_collection(&store, &chat, &embedder, &plan(false))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "store");
    assert!(err.to_string().contains("expected 768"));
    assert!(!store.journal().contains(&StoreOp::Insert));
}

#[tokio::test]
async fn test_insert_failure_is_store_error() {
    let store = InMemoryStore::new()
        .with_index("vector_index")
        .failing_inserts();
    let chat = ScriptedChat {
        reply: valid_reply(),
    };
    let embedder = FixedEmbedder::new(vec![0.1]);

    let err = seed_collection(&store, &chat, &embedder, &plan(false))
        .await
        .unwrap_err();

    assert!(matches!(err, SeedError::Store(_)));
    assert!(err.to_string().contains("failed to insert document"));
    assert!(store.documents().is_empty());
}

#[tokio::test]
async fn test_custom_index_keys_shape_the_document() {
    let store = InMemoryStore::new().with_index("shops_idx");
    let chat = ScriptedChat {
        reply: valid_reply(),
    };
    let embedder = FixedEmbedder::new(vec![1.0]);
    let plan = SeedPlan {
        index: VectorIndex {
            name: "shops_idx".to_string(),
            text_key: "summary".to_string(),
            embedding_key: "vector".to_string(),
        },
        min_products: 10,
        require_index: true,
    };

    seed_collection(&store, &chat, &embedder, &plan).await.unwrap();

    let doc = &store.documents()[0];
    assert!(doc["summary"].as_str().unwrap().starts_with("Harbor Greens, owned by Maya Ortiz"));
    assert_eq!(doc["vector"], json!([1.0]));
    assert!(doc.get("embedding_text").is_none());
}

#[tokio::test]
async fn test_store_closed_after_success() {
    let store = InMemoryStore::new().with_index("vector_index");
    let chat = ScriptedChat {
        reply: valid_reply(),
    };
    let embedder = FixedEmbedder::new(vec![0.1]);

    seed_and_close(&store, &chat, &embedder, &plan(false))
        .await
        .unwrap();

    assert_eq!(
        store.journal(),
        vec![
            StoreOp::Ping,
            StoreOp::IndexCheck,
            StoreOp::Clear,
            StoreOp::Insert,
            StoreOp::Close
        ]
    );
}

#[tokio::test]
async fn test_store_closed_after_failed_ping() {
    let store = InMemoryStore::new().unreachable();
    let chat = ScriptedChat {
        reply: valid_reply(),
    };
    let embedder = FixedEmbedder::new(vec![0.1]);

    let err = seed_and_close(&store, &chat, &embedder, &plan(false))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "connectivity");
    assert_eq!(store.journal(), vec![StoreOp::Ping, StoreOp::Close]);
}

#[tokio::test]
async fn test_store_closed_after_rejected_output() {
    let store = InMemoryStore::new().with_index("vector_index");
    let chat = ScriptedChat {
        reply: "I cannot help with that.".to_string(),
    };
    let embedder = FixedEmbedder::new(vec![0.1]);

    let err = seed_and_close(&store, &chat, &embedder, &plan(false))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "generation");
    assert_eq!(store.journal().last(), Some(&StoreOp::Close));
    assert!(!store.journal().contains(&StoreOp::Insert));
}

#[tokio::test]
async fn test_store_closed_after_failed_insert() {
    let store = InMemoryStore::new()
        .with_index("vector_index")
        .failing_inserts();
    let chat = ScriptedChat {
        reply: valid_reply(),
    };
    let embedder = FixedEmbedder::new(vec![0.1]);

    let err = seed_and_close(&store, &chat, &embedder, &plan(false))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "store");
    assert_eq!(
        store.journal(),
        vec![
            StoreOp::Ping,
            StoreOp::IndexCheck,
            StoreOp::Clear,
            StoreOp::Insert,
            StoreOp::Close
        ]
    );
    assert_eq!(
        store.journal().iter().filter(|op| **op == StoreOp::Close).count(),
        1
    );
}
