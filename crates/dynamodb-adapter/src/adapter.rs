//! Key-value fixture adapter.

use crate::api::{DynamoDbApi, KeySchema};
use crate::connection::DynamoDbConnection;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{DeleteRequest, PutRequest, WriteRequest};
use aws_sdk_dynamodb::Client;
use dynamodb_types::{item_from_native, item_from_record, Item};
use fixture_core::meta::discover;
use fixture_core::{
    clamp_window_size, ensure_folder, join_all_settled, read_records, windows, Adapter,
    FixtureError, FixtureFile, FixtureResolver, Operation, Result, TableMetaCache, TableMetaMap,
    MAX_WINDOW_SIZE,
};
use std::path::Path;
use tracing::{debug, info};

/// Fixture adapter for DynamoDB.
pub struct DynamoDbAdapter<C = Client> {
    client: C,
    resolver: FixtureResolver,
    window_size: usize,
    tables: TableMetaCache<KeySchema>,
}

impl DynamoDbAdapter<Client> {
    /// Build a client from `connection` and wrap it.
    pub async fn connect(connection: &DynamoDbConnection) -> Self {
        Self::new(connection.client().await)
    }
}

impl<C: DynamoDbApi> DynamoDbAdapter<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            resolver: FixtureResolver::dynamodb(),
            window_size: MAX_WINDOW_SIZE,
            tables: TableMetaCache::new(),
        }
    }

    /// Replace the default fixture naming convention.
    pub fn with_resolver(mut self, resolver: FixtureResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Use smaller batches than `BatchWriteItem` allows.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = clamp_window_size(window_size);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Key schema of every table, discovered on first use.
    pub async fn table_meta(&self) -> Result<&TableMetaMap<KeySchema>> {
        self.tables
            .get_or_discover(|| async {
                let names = self
                    .client
                    .list_table_names()
                    .await
                    .map_err(|e| FixtureError::discovery(Operation::ListTables, e))?;
                debug!("DynamoDB lists {} tables", names.len());

                discover(names, |table| async move {
                    self.client
                        .describe_key_schema(&table)
                        .await
                        .map_err(|e| FixtureError::discovery(Operation::DescribeTable, e))
                })
                .await
            })
            .await
    }

    async fn truncate_table(&self, table: &str, keys: &KeySchema) -> Result<()> {
        let attributes = keys.attribute_names();

        // Pages are consumed in order before any delete is issued.
        let mut key_items = Vec::new();
        let mut start = None;
        loop {
            let page = self
                .client
                .scan_page(table, &attributes, start.take())
                .await
                .map_err(|e| FixtureError::write(table, Operation::TruncateScan, e))?;

            key_items.extend(page.items.iter().map(|item| project_keys(item, keys)));

            match page.last_evaluated_key {
                Some(next) => start = Some(next),
                None => break,
            }
        }

        let count = key_items.len();
        let requests = key_items
            .into_iter()
            .map(|key| {
                DeleteRequest::builder()
                    .set_key(Some(key))
                    .build()
                    .map(|delete| WriteRequest::builder().delete_request(delete).build())
                    .map_err(|e| FixtureError::write(table, Operation::TruncateDelete, e))
            })
            .collect::<Result<Vec<_>>>()?;

        self.write_windows(table, requests, Operation::TruncateDelete)
            .await?;
        debug!("Deleted {} items from table '{}'", count, table);
        Ok(())
    }

    async fn load_file(&self, file: &FixtureFile) -> Result<()> {
        let records = read_records(file).await?;

        let items: Vec<Item> = if file.kind.is_dump() {
            records
                .iter()
                .map(item_from_native)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| FixtureError::parse(&file.table, &file.path, e))?
        } else {
            records.into_iter().map(item_from_record).collect()
        };

        let count = items.len();
        let requests = items
            .into_iter()
            .map(|item| {
                PutRequest::builder()
                    .set_item(Some(item))
                    .build()
                    .map(|put| WriteRequest::builder().put_request(put).build())
                    .map_err(|e| FixtureError::write(&file.table, Operation::LoadPut, e))
            })
            .collect::<Result<Vec<_>>>()?;

        self.write_windows(&file.table, requests, Operation::LoadPut)
            .await?;
        debug!(
            "Loaded {} items into table '{}' from {}",
            count,
            file.table,
            file.path.display()
        );
        Ok(())
    }

    /// Issue one `BatchWriteItem` per window, all concurrently.
    async fn write_windows(
        &self,
        table: &str,
        requests: Vec<WriteRequest>,
        operation: Operation,
    ) -> Result<()> {
        join_all_settled(
            windows(requests, self.window_size)
                .into_iter()
                .map(|batch| async move {
                    self.client
                        .batch_write(table, batch)
                        .await
                        .map_err(|e| FixtureError::write(table, operation, e))
                }),
        )
        .await?;
        Ok(())
    }
}

/// Reduce a scanned item to its primary-key attributes.
pub fn project_keys(item: &Item, keys: &KeySchema) -> Item {
    keys.attribute_names()
        .into_iter()
        .filter_map(|name| item.get(&name).cloned().map(|value| (name, value)))
        .collect()
}

#[async_trait]
impl<C: DynamoDbApi> Adapter for DynamoDbAdapter<C> {
    fn name(&self) -> &str {
        "dynamodb"
    }

    async fn truncate(&self) -> Result<()> {
        let tables = self.table_meta().await?;
        info!("Truncating {} DynamoDB tables", tables.len());

        join_all_settled(
            tables
                .iter()
                .map(|(table, keys)| self.truncate_table(table, keys)),
        )
        .await?;
        Ok(())
    }

    async fn load(&self, folder: &Path) -> Result<()> {
        ensure_folder(folder).await?;
        let tables = self.table_meta().await?;
        info!(
            "Loading DynamoDB fixtures from {} into {} tables",
            folder.display(),
            tables.len()
        );

        join_all_settled(tables.keys().map(|table| async move {
            match self.resolver.resolve(folder, table).await? {
                Some(file) => self.load_file(&file).await,
                None => {
                    debug!("No fixture for table '{}', skipping", table);
                    Ok(())
                }
            }
        }))
        .await?;
        Ok(())
    }

    async fn release(&self) -> Result<()> {
        // The SDK client holds no connection that needs explicit shutdown.
        debug!("Released DynamoDB adapter");
        Ok(())
    }
}
