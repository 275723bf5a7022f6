//! DynamoDB JSON → AttributeValue
//!
//! Parses the wire encoding used by `aws dynamodb scan` dumps, where every
//! attribute is wrapped in a single-key type descriptor:
//!
//! ```json
//! {"pk": {"S": "post#1"}, "createdAt": {"N": "1712405283"}}
//! ```

use crate::{ConversionError, Item};
use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{Map, Value};

/// Parse one DynamoDB JSON item.
pub fn item_from_native(record: &Map<String, Value>) -> Result<Item, ConversionError> {
    record
        .iter()
        .map(|(k, v)| Ok((k.clone(), parse(v, &format!("$.{k}"))?)))
        .collect()
}

/// Parse one DynamoDB JSON attribute value.
pub fn native_to_attribute_value(value: &Value) -> Result<AttributeValue, ConversionError> {
    parse(value, "$")
}

fn parse(value: &Value, path: &str) -> Result<AttributeValue, ConversionError> {
    let Value::Object(descriptor) = value else {
        return Err(invalid(path, "expected a type descriptor object"));
    };
    if descriptor.len() != 1 {
        return Err(invalid(
            path,
            &format!("expected exactly one type key, found {}", descriptor.len()),
        ));
    }
    let Some((tag, inner)) = descriptor.iter().next() else {
        return Err(invalid(path, "empty type descriptor"));
    };

    let av = match tag.as_str() {
        "S" => AttributeValue::S(string(inner, path)?),
        "N" => AttributeValue::N(number(inner, path)?),
        "B" => AttributeValue::B(blob(inner, path)?),
        "BOOL" => AttributeValue::Bool(boolean(inner, path)?),
        "NULL" => AttributeValue::Null(boolean(inner, path)?),
        "L" => AttributeValue::L(
            array(inner, path)?
                .iter()
                .enumerate()
                .map(|(i, v)| parse(v, &format!("{path}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        "M" => {
            let Value::Object(map) = inner else {
                return Err(invalid(path, "M expects an object"));
            };
            AttributeValue::M(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), parse(v, &format!("{path}.{k}"))?)))
                    .collect::<Result<_, ConversionError>>()?,
            )
        }
        "SS" => AttributeValue::Ss(
            array(inner, path)?
                .iter()
                .map(|v| string(v, path))
                .collect::<Result<_, _>>()?,
        ),
        "NS" => AttributeValue::Ns(
            array(inner, path)?
                .iter()
                .map(|v| number(v, path))
                .collect::<Result<_, _>>()?,
        ),
        "BS" => AttributeValue::Bs(
            array(inner, path)?
                .iter()
                .map(|v| blob(v, path))
                .collect::<Result<_, _>>()?,
        ),
        other => {
            return Err(ConversionError::UnknownDescriptor {
                path: path.to_string(),
                descriptor: other.to_string(),
            })
        }
    };
    Ok(av)
}

fn invalid(path: &str, reason: &str) -> ConversionError {
    ConversionError::InvalidDescriptor {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

fn string(value: &Value, path: &str) -> Result<String, ConversionError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(path, "expected a string"))
}

// Numbers are strings on the wire; bare JSON numbers are accepted too.
fn number(value: &Value, path: &str) -> Result<String, ConversionError> {
    match value {
        Value::String(s) if s.parse::<serde_json::Number>().is_ok() => Ok(s.clone()),
        Value::String(s) => Err(ConversionError::InvalidNumber {
            path: path.to_string(),
            value: s.clone(),
        }),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(invalid(path, "expected a number")),
    }
}

fn boolean(value: &Value, path: &str) -> Result<bool, ConversionError> {
    value
        .as_bool()
        .ok_or_else(|| invalid(path, "expected a boolean"))
}

fn blob(value: &Value, path: &str) -> Result<Blob, ConversionError> {
    let encoded = string(value, path)?;
    BASE64
        .decode(encoded.as_bytes())
        .map(Blob::new)
        .map_err(|e| ConversionError::InvalidBase64 {
            path: path.to_string(),
            reason: e.to_string(),
        })
}

fn array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, ConversionError> {
    value
        .as_array()
        .ok_or_else(|| invalid(path, "expected an array"))
}
