//! The subset of DynamoDB the adapter needs.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{KeyType, WriteRequest};
use aws_sdk_dynamodb::Client;
use dynamodb_types::Item;
use fixture_core::BoxError;
use std::collections::HashMap;

/// Primary key attributes of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    pub partition_key: String,
    pub sort_key: Option<String>,
}

impl KeySchema {
    pub fn new(partition_key: impl Into<String>, sort_key: Option<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key,
        }
    }

    /// Partition key first, then the sort key if the table has one.
    pub fn attribute_names(&self) -> Vec<String> {
        std::iter::once(self.partition_key.clone())
            .chain(self.sort_key.clone())
            .collect()
    }
}

/// One page of a scan.
#[derive(Debug, Default, Clone)]
pub struct ScanPage {
    pub items: Vec<Item>,
    /// Present when more pages follow.
    pub last_evaluated_key: Option<Item>,
}

/// DynamoDB operations used by the adapter.
#[async_trait]
pub trait DynamoDbApi: Send + Sync {
    /// Names of every table, following `ListTables` pagination.
    async fn list_table_names(&self) -> Result<Vec<String>, BoxError>;

    /// Key schema of `table`, or `None` when the table no longer exists.
    async fn describe_key_schema(&self, table: &str) -> Result<Option<KeySchema>, BoxError>;

    /// Scan one page of `table`, projecting only `attributes`.
    async fn scan_page(
        &self,
        table: &str,
        attributes: &[String],
        exclusive_start_key: Option<Item>,
    ) -> Result<ScanPage, BoxError>;

    /// Send one `BatchWriteItem` request for `table`.
    ///
    /// Fails if the store leaves any request unprocessed.
    async fn batch_write(&self, table: &str, requests: Vec<WriteRequest>) -> Result<(), BoxError>;
}

#[async_trait]
impl DynamoDbApi for Client {
    async fn list_table_names(&self) -> Result<Vec<String>, BoxError> {
        let mut names = Vec::new();
        let mut start: Option<String> = None;

        loop {
            let response = self
                .list_tables()
                .set_exclusive_start_table_name(start.take())
                .send()
                .await?;

            names.extend(response.table_names.unwrap_or_default());

            match response.last_evaluated_table_name {
                Some(next) => start = Some(next),
                None => break,
            }
        }

        Ok(names)
    }

    async fn describe_key_schema(&self, table: &str) -> Result<Option<KeySchema>, BoxError> {
        let response = match self.describe_table().table_name(table).send().await {
            Ok(response) => response,
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception()) =>
            {
                return Ok(None)
            }
            Err(e) => return Err(e.into()),
        };

        let Some(description) = response.table else {
            return Ok(None);
        };

        let mut partition_key = None;
        let mut sort_key = None;
        for element in description.key_schema.unwrap_or_default() {
            match element.key_type {
                KeyType::Hash => partition_key = Some(element.attribute_name),
                KeyType::Range => sort_key = Some(element.attribute_name),
                _ => {}
            }
        }

        let partition_key = partition_key
            .ok_or_else(|| format!("table '{table}' has no partition key in its key schema"))?;
        Ok(Some(KeySchema::new(partition_key, sort_key)))
    }

    async fn scan_page(
        &self,
        table: &str,
        attributes: &[String],
        exclusive_start_key: Option<Item>,
    ) -> Result<ScanPage, BoxError> {
        // Placeholders keep reserved words (e.g. `name`) usable as key names.
        let names: HashMap<String, String> = attributes
            .iter()
            .enumerate()
            .map(|(i, a)| (format!("#k{i}"), a.clone()))
            .collect();
        let projection = (0..attributes.len())
            .map(|i| format!("#k{i}"))
            .collect::<Vec<_>>()
            .join(", ");

        let response = self
            .scan()
            .table_name(table)
            .projection_expression(projection)
            .set_expression_attribute_names(Some(names))
            .set_exclusive_start_key(exclusive_start_key)
            .send()
            .await?;

        Ok(ScanPage {
            items: response.items.unwrap_or_default(),
            last_evaluated_key: response.last_evaluated_key.filter(|k| !k.is_empty()),
        })
    }

    async fn batch_write(&self, table: &str, requests: Vec<WriteRequest>) -> Result<(), BoxError> {
        let response = self
            .batch_write_item()
            .request_items(table, requests)
            .send()
            .await?;

        let unprocessed = response
            .unprocessed_items
            .and_then(|mut items| items.remove(table))
            .map(|requests| requests.len())
            .unwrap_or(0);
        if unprocessed > 0 {
            return Err(format!("{unprocessed} write requests were left unprocessed").into());
        }
        Ok(())
    }
}
