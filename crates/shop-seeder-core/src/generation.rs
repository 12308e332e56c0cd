//! Structured generation of a single [`ShopRecord`].
//!
//! The language model is an opaque [`ChatModel`]: one prompt in, one
//! response out. Correctness is enforced entirely after the fact by
//! [`parse_shop`](crate::schema::parse_shop); output that does not
//! conform is rejected, never repaired.

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::models::ShopRecord;
use crate::schema::{self, SchemaError};

/// A text-generation model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the model identifier (e.g. `"gemini-1.5-pro"`).
    fn model_name(&self) -> &str;
    /// Send `prompt` and return the model's text response.
    async fn invoke(&self, prompt: &str) -> Result<String>;
}

/// Failure to obtain a conforming record from the model.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The model call itself failed (transport, auth, empty response).
    #[error("model call failed: {0:#}")]
    Model(anyhow::Error),

    /// The model answered, but the answer does not conform to the schema.
    #[error("model output rejected: {0}")]
    Rejected(#[from] SchemaError),
}

/// Build the generation prompt: the task description followed by the
/// schema's format instructions.
pub fn shop_prompt(min_products: usize) -> String {
    format!(
        "You generate realistic sample data for a grocery store directory.\n\
         Create exactly ONE fictional grocery store with these fields:\n\
         \x20 * name\n\
         \x20 * owner\n\
         \x20 * location (latitude, longitude and a street address)\n\
         \x20 * rating\n\
         \x20 * products (each with name, category, price, stock and imageUrl)\n\
         \n\
         Use realistic values and vary the product data. Include at least {} \
         different products across diverse categories (fruits, vegetables, dairy, \
         bakery, pantry and so on).\n\
         \n\
         {}",
        min_products,
        schema::format_instructions()
    )
}

/// Prompt `model` once and parse its answer into a validated record.
pub async fn generate_shop(
    model: &dyn ChatModel,
    min_products: usize,
) -> Result<ShopRecord, GenerationError> {
    let prompt = shop_prompt(min_products);
    let response = model
        .invoke(&prompt)
        .await
        .map_err(GenerationError::Model)?;
    Ok(schema::parse_shop(&response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Scripted {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(reply: Result<&str, &str>) -> Self {
            Self {
                reply: reply.map(str::to_string).map_err(str::to_string),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for Scripted {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn invoke(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    const VALID: &str = r#"{
        "name": "Green Basket",
        "owner": "A. Lee",
        "location": { "latitude": 40.0, "longitude": -74.0, "address": "1 Main St" },
        "rating": 4.5,
        "products": [
            { "name": "Apple", "category": "fruit", "price": 1.2, "stock": 50, "imageUrl": "http://x/a.png" }
        ]
    }"#;

    #[test]
    fn test_prompt_contains_task_and_instructions() {
        let prompt = shop_prompt(10);
        assert!(prompt.contains("ONE fictional grocery store"));
        assert!(prompt.contains("at least 10 different products"));
        assert!(prompt.ends_with(&schema::format_instructions()));
    }

    #[tokio::test]
    async fn test_generate_valid_record() {
        let model = Scripted::new(Ok(VALID));
        let shop = generate_shop(&model, 10).await.unwrap();
        assert_eq!(shop.name, "Green Basket");
        assert_eq!(model.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_rejects_nonconforming_output() {
        let model = Scripted::new(Ok(
            r#"{"name":"X","owner":"Y","location":{"latitude":1,"longitude":2,"address":"Z"},"rating":3,"products":[{"name":"Apple","category":"fruit","price":"cheap","stock":1,"imageUrl":"http://x/a.png"}]}"#,
        ));
        let err = generate_shop(&model, 10).await.unwrap_err();
        assert!(matches!(err, GenerationError::Rejected(SchemaError::Malformed(_))));
        // no repair attempt
        assert_eq!(model.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_surfaces_model_failure() {
        let model = Scripted::new(Err("quota exceeded"));
        let err = generate_shop(&model, 10).await.unwrap_err();
        assert!(matches!(err, GenerationError::Model(_)));
        assert!(err.to_string().contains("quota exceeded"));
    }
}
