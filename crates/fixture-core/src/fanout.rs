//! Concurrent fan-out with wait-for-all semantics.

use crate::error::{FixtureError, Result};
use futures::future::join_all;
use std::future::Future;

/// Drive every future to completion and aggregate their failures.
///
/// Unlike `try_join_all`, a failure does not cancel the siblings: every
/// future runs to completion so side effects of the successful ones persist.
/// One failure is returned as-is, several are wrapped in
/// [`FixtureError::Multiple`].
pub async fn join_all_settled<I, F, T>(futures: I) -> Result<Vec<T>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T>>,
{
    let results = join_all(futures).await;

    let mut values = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(e) => errors.push(e),
        }
    }

    match errors.len() {
        0 => Ok(values),
        1 => Err(errors.remove(0)),
        _ => Err(FixtureError::Multiple(errors)),
    }
}
