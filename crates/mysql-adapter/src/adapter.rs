//! Relational fixture adapter.

use crate::row::{normalize_json_columns, InsertStatement};
use crate::store::{MySqlStore, SqlStore};
use async_trait::async_trait;
use fixture_core::meta::discover;
use fixture_core::{
    clamp_window_size, ensure_folder, join_all_settled, read_records, read_script, windows,
    Adapter, FixtureError, FixtureFile, FixtureResolver, Operation, Result, TableMetaCache,
    TableMetaMap, MAX_WINDOW_SIZE,
};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Per-table facts needed to load JSON rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableColumns {
    /// Columns declared as `JSON`; their values are inserted as JSON text.
    pub json_columns: BTreeSet<String>,
}

/// Fixture adapter for MySQL.
pub struct MySqlAdapter<S = MySqlStore> {
    store: S,
    resolver: FixtureResolver,
    window_size: usize,
    tables: TableMetaCache<TableColumns>,
}

impl MySqlAdapter<MySqlStore> {
    /// Open an owned pool for `url`; `release` disconnects it.
    pub fn connect(url: &str) -> Result<Self> {
        Ok(Self::new(MySqlStore::connect(url)?))
    }

    /// Use a pool owned by the caller; `release` leaves it open.
    pub fn from_pool(pool: mysql_async::Pool) -> Self {
        Self::new(MySqlStore::from_pool(pool))
    }
}

impl<S: SqlStore> MySqlAdapter<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            resolver: FixtureResolver::mysql(),
            window_size: MAX_WINDOW_SIZE,
            tables: TableMetaCache::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: FixtureResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Rows per INSERT statement, at most [`MAX_WINDOW_SIZE`].
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = clamp_window_size(window_size);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// JSON columns of every table, discovered on first use.
    pub async fn table_meta(&self) -> Result<&TableMetaMap<TableColumns>> {
        self.tables
            .get_or_discover(|| async {
                let names = self
                    .store
                    .list_tables()
                    .await
                    .map_err(|e| FixtureError::discovery(Operation::ListTables, e))?;
                debug!("MySQL lists {} tables", names.len());

                discover(names, |table| async move {
                    let columns = self
                        .store
                        .describe_columns(&table)
                        .await
                        .map_err(|e| FixtureError::discovery(Operation::DescribeTable, e))?;
                    Ok(columns.map(|columns| TableColumns {
                        json_columns: columns
                            .into_iter()
                            .filter(|c| c.is_json())
                            .map(|c| c.name)
                            .collect(),
                    }))
                })
                .await
            })
            .await
    }

    async fn load_file(&self, file: &FixtureFile, columns: &TableColumns) -> Result<()> {
        if file.kind.is_dump() {
            let script = read_script(file).await?;
            self.store
                .execute_script(&script)
                .await
                .map_err(|e| FixtureError::write(&file.table, Operation::Script, e))?;
            debug!("Executed {} for table '{}'", file.path.display(), file.table);
            return Ok(());
        }

        let records = read_records(file)
            .await?
            .into_iter()
            .map(|record| normalize_json_columns(record, &columns.json_columns))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| FixtureError::write(&file.table, Operation::Insert, e))?;
        let count = records.len();

        let statements: Vec<InsertStatement> = windows(records, self.window_size)
            .into_iter()
            .map(|batch| InsertStatement::from_records(&file.table, batch))
            .collect();

        join_all_settled(statements.iter().map(|statement| async move {
            self.store
                .insert(statement)
                .await
                .map_err(|e| FixtureError::write(&file.table, Operation::Insert, e))
        }))
        .await?;

        debug!(
            "Inserted {} rows into table '{}' from {}",
            count,
            file.table,
            file.path.display()
        );
        Ok(())
    }
}

#[async_trait]
impl<S: SqlStore> Adapter for MySqlAdapter<S> {
    fn name(&self) -> &str {
        "mysql"
    }

    async fn truncate(&self) -> Result<()> {
        let tables = self.table_meta().await?;
        info!("Truncating {} MySQL tables", tables.len());

        // One table at a time: the foreign key override is session state and
        // concurrent truncations under it can deadlock.
        for table in tables.keys() {
            self.store
                .truncate_table(table)
                .await
                .map_err(|e| FixtureError::write(table, Operation::Truncate, e))?;
            debug!("Truncated table '{}'", table);
        }
        Ok(())
    }

    async fn load(&self, folder: &Path) -> Result<()> {
        ensure_folder(folder).await?;
        let tables = self.table_meta().await?;
        info!(
            "Loading MySQL fixtures from {} into {} tables",
            folder.display(),
            tables.len()
        );

        join_all_settled(tables.iter().map(|(table, columns)| async move {
            match self.resolver.resolve(folder, table).await? {
                Some(file) => self.load_file(&file, columns).await,
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
        self.store
            .disconnect()
            .await
            .map_err(|source| FixtureError::Connectivity {
                backend: "mysql".to_string(),
                source,
            })
    }
}
