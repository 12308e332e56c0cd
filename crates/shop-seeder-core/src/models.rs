//! Core data models for the seeding pipeline.
//!
//! A [`ShopRecord`] is produced once per run by the structured generator,
//! rendered into a summary, embedded, and persisted as an
//! [`IndexedDocument`]. Records are never mutated after validation.

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// One product sold by a generated shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: String,
    pub category: String,
    /// Unit price, non-negative.
    pub price: f64,
    /// Units on hand. Integer-valued floats such as `50.0` are accepted.
    #[serde(deserialize_with = "whole_number")]
    pub stock: u64,
    /// Product image location; must parse as an absolute URL.
    pub image_url: String,
}

/// Decode a non-negative integer from any JSON number with no fractional
/// part.
fn whole_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;
    if let Some(value) = number.as_u64() {
        return Ok(value);
    }
    match number.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => {
            Ok(f as u64)
        }
        Some(f) => Err(de::Error::invalid_value(
            Unexpected::Float(f),
            &"a non-negative integer",
        )),
        None => Err(de::Error::invalid_value(
            Unexpected::Other("number"),
            &"a non-negative integer",
        )),
    }
}

/// Geographic position and street address of a shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

/// A synthetic grocery store, the top-level entity seeded per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopRecord {
    pub name: String,
    pub owner: String,
    pub location: Location,
    pub rating: f64,
    /// Products in generation order. At least ten are requested from the
    /// model but fewer are not rejected.
    pub products: Vec<ProductRecord>,
}

/// Where the vector index expects its text and vector fields.
///
/// The index itself is managed outside the pipeline; this only names it
/// and describes the document layout it was built over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorIndex {
    pub name: String,
    pub text_key: String,
    pub embedding_key: String,
}

impl Default for VectorIndex {
    fn default() -> Self {
        Self {
            name: "vector_index".to_string(),
            text_key: "embedding_text".to_string(),
            embedding_key: "embedding".to_string(),
        }
    }
}

/// Summary text, its embedding, and the record it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDocument {
    pub content: String,
    pub embedding: Vec<f32>,
    pub metadata: ShopRecord,
}

impl IndexedDocument {
    /// Render the stored document shape for `index`.
    ///
    /// The metadata fields are spread at the top level, then the text and
    /// vector fields are set under the index's configured keys. The text
    /// and vector keys take precedence over a metadata field of the same
    /// name.
    pub fn to_json(&self, index: &VectorIndex) -> serde_json::Result<Value> {
        let mut fields = match serde_json::to_value(&self.metadata)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        fields.insert(index.text_key.clone(), Value::String(self.content.clone()));
        fields.insert(
            index.embedding_key.clone(),
            serde_json::to_value(&self.embedding)?,
        );
        Ok(Value::Object(fields))
    }
}
