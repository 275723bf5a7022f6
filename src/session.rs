//! Session orchestrator.
//!
//! A [`Session`] owns the adapters configured for a test run and fans every
//! operation out to all of them at once. It replaces process-wide state: the
//! test harness creates one session, keeps it for the run and releases it at
//! the end.

use fixture_core::{join_all_settled, Adapter, FixtureError, Result};
use std::path::Path;
use tracing::{debug, info};

/// The adapters configured for a test run.
#[derive(Default)]
pub struct Session {
    adapters: Vec<Box<dyn Adapter>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adapters(adapters: Vec<Box<dyn Adapter>>) -> Self {
        Self { adapters }
    }

    /// Replace the configured adapters wholesale.
    ///
    /// Adapters dropped here are not released; call [`release`](Self::release)
    /// first if they own connections.
    pub fn configure(&mut self, adapters: Vec<Box<dyn Adapter>>) {
        debug!("Configuring session with {} adapters", adapters.len());
        self.adapters = adapters;
    }

    pub fn adapter_names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Truncate every table of every adapter.
    pub async fn truncate(&self) -> Result<()> {
        let adapters = self.configured()?;
        info!("Truncating {} adapters", adapters.len());

        join_all_settled(adapters.iter().map(|adapter| async move {
            adapter
                .truncate()
                .await
                .map_err(|e| tagged(adapter.as_ref(), e))
        }))
        .await?;
        Ok(())
    }

    /// Load the fixtures in `folder` through every adapter.
    pub async fn load(&self, folder: impl AsRef<Path>) -> Result<()> {
        let folder = folder.as_ref();
        let adapters = self.configured()?;
        info!(
            "Loading fixtures from {} through {} adapters",
            folder.display(),
            adapters.len()
        );

        join_all_settled(adapters.iter().map(|adapter| async move {
            adapter
                .load(folder)
                .await
                .map_err(|e| tagged(adapter.as_ref(), e))
        }))
        .await?;
        Ok(())
    }

    /// Truncate, then load `folder`.
    pub async fn reset(&self, folder: impl AsRef<Path>) -> Result<()> {
        self.truncate().await?;
        self.load(folder).await
    }

    /// Release every adapter and leave the session unconfigured.
    pub async fn release(&mut self) -> Result<()> {
        let adapters = std::mem::take(&mut self.adapters);
        if adapters.is_empty() {
            return Err(no_adapters());
        }
        info!("Releasing {} adapters", adapters.len());

        join_all_settled(adapters.iter().map(|adapter| async move {
            adapter
                .release()
                .await
                .map_err(|e| tagged(adapter.as_ref(), e))
        }))
        .await?;
        Ok(())
    }

    fn configured(&self) -> Result<&[Box<dyn Adapter>]> {
        if self.adapters.is_empty() {
            return Err(no_adapters());
        }
        Ok(&self.adapters)
    }
}

fn no_adapters() -> FixtureError {
    FixtureError::Configuration("no adapters configured".to_string())
}

fn tagged(adapter: &dyn Adapter, source: FixtureError) -> FixtureError {
    FixtureError::Adapter {
        adapter: adapter.name().to_string(),
        source: Box::new(source),
    }
}
