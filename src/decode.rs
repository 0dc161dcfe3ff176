use serde_json::Value;

use crate::domain::{ProductId, ProductRecord};
use crate::error::HarvestError;

/// Turns a product response body into a record.
///
/// Malformed JSON and JSON that is not an object are `Decode` errors.
/// JSON that carries nothing (`null`, `{}`, `[]`, `""`, `0`, `false`) is
/// reported as `EmptyPayload`.
pub fn decode_product(id: ProductId, body: &[u8]) -> Result<ProductRecord, HarvestError> {
    let value: Value = serde_json::from_slice(body).map_err(|err| HarvestError::Decode {
        id,
        message: err.to_string(),
    })?;

    if is_empty_value(&value) {
        return Err(HarvestError::EmptyPayload { id });
    }

    match value {
        Value::Object(fields) => Ok(ProductRecord::new(id, fields)),
        other => Err(HarvestError::Decode {
            id,
            message: format!("expected a JSON object, got {}", kind_of(&other)),
        }),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
