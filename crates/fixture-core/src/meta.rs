//! Per-adapter table metadata cache.
//!
//! Adapters need a few structural facts about each table (key attributes for
//! DynamoDB, JSON columns for MySQL). They are discovered once, on first use,
//! and reused for the lifetime of the adapter since the schema is assumed
//! stable for a test session.

use crate::error::Result;
use crate::fanout::join_all_settled;
use std::collections::BTreeMap;
use std::future::Future;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Table name to metadata. Iteration order is the table name order.
pub type TableMetaMap<M> = BTreeMap<String, M>;

/// Lazily populated, memoized [`TableMetaMap`].
///
/// Concurrent first callers wait on a single discovery pass. A failed pass
/// leaves the cache empty so the next caller tries again.
#[derive(Debug)]
pub struct TableMetaCache<M> {
    cell: OnceCell<TableMetaMap<M>>,
}

impl<M> Default for TableMetaCache<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> TableMetaCache<M> {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// The cached map, if discovery already ran.
    pub fn get(&self) -> Option<&TableMetaMap<M>> {
        self.cell.get()
    }

    /// Return the cached map, running `discover` if this is the first call.
    pub async fn get_or_discover<F, Fut>(&self, discover: F) -> Result<&TableMetaMap<M>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TableMetaMap<M>>>,
    {
        self.cell.get_or_try_init(discover).await
    }
}

/// Describe every table concurrently and collect the results.
///
/// `describe` returns `Ok(None)` for a table that can no longer be described
/// (for instance dropped between listing and describing); such tables are
/// left out of the map. Any error fails the whole pass.
pub async fn discover<M, D, Fut>(tables: Vec<String>, describe: D) -> Result<TableMetaMap<M>>
where
    D: Fn(String) -> Fut,
    Fut: Future<Output = Result<Option<M>>>,
{
    let total = tables.len();
    let described = join_all_settled(tables.into_iter().map(|table| {
        let pending = describe(table.clone());
        async move { pending.await.map(|meta| (table, meta)) }
    }))
    .await?;

    let mut map = TableMetaMap::new();
    for (table, meta) in described {
        match meta {
            Some(meta) => {
                map.insert(table, meta);
            }
            None => warn!("Table '{}' could not be described, skipping it", table),
        }
    }

    debug!("Discovered {} of {} listed tables", map.len(), total);
    Ok(map)
}
