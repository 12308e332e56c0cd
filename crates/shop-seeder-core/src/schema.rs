//! Shop record schema: parsing, validation, and prompt format instructions.
//!
//! The schema is the statically-typed [`ShopRecord`] plus the checks that
//! serde cannot express (non-negative prices, well-formed image URLs).
//! [`parse_shop`] is the only way model output becomes a record; anything
//! that does not conform is a [`SchemaError`].
//!
//! [`format_instructions`] renders the same shape as a JSON Schema
//! document for inclusion in the generation prompt.

use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

use crate::models::ShopRecord;

/// A record that does not conform to the shop schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The text contains no JSON object at all.
    #[error("no JSON object found in model output")]
    NoJson,

    /// Not valid JSON, a required field is missing, or a field has the
    /// wrong type (including negative integers).
    #[error("output does not match the shop schema: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Well-typed but violates a value constraint.
    #[error("invalid value at `{path}`: {reason}")]
    Invalid { path: String, reason: String },
}

impl SchemaError {
    fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Invalid {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Parse model output into a validated [`ShopRecord`].
///
/// Accepts a bare JSON object, a markdown-fenced JSON block, or JSON
/// surrounded by prose. Unknown fields are ignored.
pub fn parse_shop(text: &str) -> Result<ShopRecord, SchemaError> {
    let raw = extract_json(text).ok_or(SchemaError::NoJson)?;
    let shop: ShopRecord = serde_json::from_str(raw)?;
    validate(&shop)?;
    Ok(shop)
}

/// Check the value constraints of an already-typed record.
pub fn validate(shop: &ShopRecord) -> Result<(), SchemaError> {
    if !shop.rating.is_finite() {
        return Err(SchemaError::invalid("rating", "must be a finite number"));
    }
    if !shop.location.latitude.is_finite() {
        return Err(SchemaError::invalid(
            "location.latitude",
            "must be a finite number",
        ));
    }
    if !shop.location.longitude.is_finite() {
        return Err(SchemaError::invalid(
            "location.longitude",
            "must be a finite number",
        ));
    }

    for (i, product) in shop.products.iter().enumerate() {
        if !product.price.is_finite() || product.price < 0.0 {
            return Err(SchemaError::invalid(
                format!("products[{}].price", i),
                format!("must be a non-negative number, got {}", product.price),
            ));
        }
        if let Err(e) = Url::parse(&product.image_url) {
            return Err(SchemaError::invalid(
                format!("products[{}].imageUrl", i),
                format!("'{}' is not a valid URL: {}", product.image_url, e),
            ));
        }
    }

    Ok(())
}

/// Locate the JSON payload inside model output.
///
/// Prefers the first markdown code fence; otherwise takes the span from
/// the first `{` to the last `}`.
fn extract_json(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```") {
        let fenced = text[start + 3..].trim_start_matches(|c: char| c.is_ascii_alphanumeric());
        if let Some(end) = fenced.find("```") {
            let body = fenced[..end].trim();
            if body.starts_with('{') {
                return Some(body);
            }
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// JSON Schema describing [`ShopRecord`].
pub fn json_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "owner": { "type": "string" },
            "location": {
                "type": "object",
                "properties": {
                    "latitude": { "type": "number" },
                    "longitude": { "type": "number" },
                    "address": { "type": "string" }
                },
                "required": ["latitude", "longitude", "address"],
                "additionalProperties": false
            },
            "rating": { "type": "number" },
            "products": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "category": { "type": "string" },
                        "price": { "type": "number", "minimum": 0 },
                        "stock": { "type": "integer", "minimum": 0 },
                        "imageUrl": { "type": "string", "format": "uri" }
                    },
                    "required": ["name", "category", "price", "stock", "imageUrl"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["name", "owner", "location", "rating", "products"],
        "additionalProperties": false,
        "$schema": "http://json-schema.org/draft-07/schema#"
    })
}

/// Output format instructions appended to the generation prompt.
pub fn format_instructions() -> String {
    let schema = serde_json::to_string(&json_schema()).unwrap_or_default();
    format!(
        "Respond with a single JSON object that conforms to the JSON Schema below. \
         Every required field must be present with the declared type, numbers must be \
         plain JSON numbers (not strings), and there must be no comments or trailing commas. \
         Wrap the object in a markdown code block tagged json.\n\n\
         ```json\n{}\n```",
        schema
    )
}
