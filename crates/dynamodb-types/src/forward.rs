//! Forward conversion: plain JSON value → AttributeValue
//!
//! Mirrors document-client marshalling: strings become `S`, numbers `N`,
//! booleans `BOOL`, null `NULL`, arrays `L` and objects `M`.

use crate::Item;
use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::{Map, Value};

/// DynamoDB attribute value wrapper for JSON conversions.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamoValue(pub AttributeValue);

impl DynamoValue {
    pub fn into_inner(self) -> AttributeValue {
        self.0
    }

    pub fn as_inner(&self) -> &AttributeValue {
        &self.0
    }
}

impl From<Value> for DynamoValue {
    fn from(value: Value) -> Self {
        let av = match value {
            Value::Null => AttributeValue::Null(true),
            Value::Bool(b) => AttributeValue::Bool(b),
            Value::Number(n) => AttributeValue::N(n.to_string()),
            Value::String(s) => AttributeValue::S(s),
            Value::Array(items) => AttributeValue::L(
                items
                    .into_iter()
                    .map(|v| DynamoValue::from(v).into_inner())
                    .collect(),
            ),
            Value::Object(map) => AttributeValue::M(item_from_record(map)),
        };
        DynamoValue(av)
    }
}

/// Convert a plain JSON object into a DynamoDB item.
pub fn item_from_record(record: Map<String, Value>) -> Item {
    record
        .into_iter()
        .map(|(k, v)| (k, DynamoValue::from(v).into_inner()))
        .collect()
}
