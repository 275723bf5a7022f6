//! DynamoDB type conversions for db43.
//!
//! # Modules
//!
//! - [`forward`] - plain JSON value → `AttributeValue` (document-style marshalling)
//! - [`reverse`] - `AttributeValue` → plain JSON value
//! - [`native`] - DynamoDB JSON (`{"S": "..."}`) → `AttributeValue`
//!
//! # Example
//!
//! ```ignore
//! use dynamodb_types::{item_from_record, DynamoValue};
//!
//! let record = serde_json::json!({"pk": "post#1", "likes": 3});
//! let item = item_from_record(record.as_object().unwrap().clone());
//! ```

pub mod forward;
pub mod native;
pub mod reverse;

use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;
use thiserror::Error;

pub use forward::{item_from_record, DynamoValue};
pub use native::{item_from_native, native_to_attribute_value};
pub use reverse::{attribute_value_to_json, item_to_record};

/// A DynamoDB item: attribute name to attribute value.
pub type Item = HashMap<String, AttributeValue>;

/// Errors raised while converting between encodings.
#[derive(Error, Debug, PartialEq)]
pub enum ConversionError {
    /// A DynamoDB JSON attribute was not a single-key type descriptor object.
    #[error("Invalid type descriptor at '{path}': {reason}")]
    InvalidDescriptor { path: String, reason: String },

    /// A type descriptor this crate does not know.
    #[error("Unknown type descriptor '{descriptor}' at '{path}'")]
    UnknownDescriptor { path: String, descriptor: String },

    /// Binary data that is not valid base64.
    #[error("Invalid base64 at '{path}': {reason}")]
    InvalidBase64 { path: String, reason: String },

    /// A number attribute that does not parse as a JSON number.
    #[error("Invalid number '{value}' at '{path}'")]
    InvalidNumber { path: String, value: String },

    /// An attribute variant with no JSON equivalent.
    #[error("Unsupported attribute value at '{path}'")]
    Unsupported { path: String },
}
