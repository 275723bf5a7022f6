//! Reverse conversion: AttributeValue → plain JSON value
//!
//! Used when reading items back (assertions, debugging). Sets become arrays
//! and binary values become base64 strings.

use crate::{ConversionError, Item};
use aws_sdk_dynamodb::types::AttributeValue;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{Map, Number, Value};

/// Convert an attribute value into its plain JSON equivalent.
pub fn attribute_value_to_json(value: &AttributeValue) -> Result<Value, ConversionError> {
    to_json(value, "$")
}

/// Convert a DynamoDB item into a plain JSON object.
pub fn item_to_record(item: &Item) -> Result<Map<String, Value>, ConversionError> {
    item.iter()
        .map(|(k, v)| Ok((k.clone(), to_json(v, &format!("$.{k}"))?)))
        .collect()
}

fn to_json(value: &AttributeValue, path: &str) -> Result<Value, ConversionError> {
    let json = match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => Value::Number(parse_number(n, path)?),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::B(blob) => Value::String(BASE64.encode(blob.as_ref())),
        AttributeValue::L(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| to_json(v, &format!("{path}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), to_json(v, &format!("{path}.{k}"))?)))
                .collect::<Result<_, ConversionError>>()?,
        ),
        AttributeValue::Ss(values) => {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(values) => Value::Array(
            values
                .iter()
                .map(|n| parse_number(n, path).map(Value::Number))
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::Bs(blobs) => Value::Array(
            blobs
                .iter()
                .map(|b| Value::String(BASE64.encode(b.as_ref())))
                .collect(),
        ),
        _ => {
            return Err(ConversionError::Unsupported {
                path: path.to_string(),
            })
        }
    };
    Ok(json)
}

fn parse_number(n: &str, path: &str) -> Result<Number, ConversionError> {
    n.parse::<Number>()
        .map_err(|_| ConversionError::InvalidNumber {
            path: path.to_string(),
            value: n.to_string(),
        })
}
