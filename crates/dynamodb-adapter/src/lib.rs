//! DynamoDB fixture adapter for db43.
//!
//! Truncation scans every table for its key attributes and deletes them in
//! `BatchWriteItem` windows; loading resolves one fixture file per table and
//! puts its items in the same windows.
//!
//! The adapter talks to DynamoDB through the [`DynamoDbApi`] trait, which is
//! implemented for `aws_sdk_dynamodb::Client`.

mod adapter;
mod api;
mod connection;

pub use adapter::{project_keys, DynamoDbAdapter};
pub use api::{DynamoDbApi, KeySchema, ScanPage};
pub use connection::DynamoDbConnection;
pub use dynamodb_types::Item;
