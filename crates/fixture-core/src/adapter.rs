//! Adapter trait definition.
//!
//! Every storage backend implements the same three-operation contract so the
//! session orchestrator can fan calls out without knowing which store it is
//! talking to.

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// A backend-specific implementation of the truncate/load/release contract.
///
/// Adapters are stateless across calls except for their table metadata cache,
/// which is populated on the first `truncate` or `load` and kept until the
/// adapter is dropped.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Short backend name used to tag errors and log lines (e.g. `dynamodb`).
    fn name(&self) -> &str;

    /// Empty every table visible to the adapter's connection.
    async fn truncate(&self) -> Result<()>;

    /// Populate tables from the fixture files found in `folder`.
    ///
    /// Tables without a matching fixture file are left untouched.
    async fn load(&self, folder: &Path) -> Result<()>;

    /// Release connection resources the adapter opened itself.
    async fn release(&self) -> Result<()>;
}
