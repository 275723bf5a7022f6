//! Error types shared by every adapter.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed backend error carried as the source of a [`FixtureError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = FixtureError> = std::result::Result<T, E>;

/// The backend request that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListTables,
    DescribeTable,
    TruncateScan,
    TruncateDelete,
    LoadPut,
    Truncate,
    Insert,
    Script,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ListTables => "list-tables",
            Operation::DescribeTable => "describe-table",
            Operation::TruncateScan => "truncate-scan",
            Operation::TruncateDelete => "truncate-delete",
            Operation::LoadPut => "load-put",
            Operation::Truncate => "truncate",
            Operation::Insert => "insert",
            Operation::Script => "script",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while resetting or repopulating a store.
#[derive(Error, Debug)]
pub enum FixtureError {
    /// Network or authentication failure talking to a backend.
    #[error("Connectivity error ({backend}): {source}")]
    Connectivity {
        backend: String,
        #[source]
        source: BoxError,
    },

    /// Listing or describing tables failed.
    #[error("Schema discovery failed during {operation}: {source}")]
    SchemaDiscovery {
        operation: Operation,
        #[source]
        source: BoxError,
    },

    /// Fixture file content is malformed for its resolved kind.
    #[error("Failed to parse fixture '{}' for table '{table}': {source}", .path.display())]
    FixtureParse {
        table: String,
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// A put/delete/insert/truncate request was rejected by the backend.
    #[error("{operation} failed for table '{table}': {source}")]
    Write {
        table: String,
        operation: Operation,
        #[source]
        source: BoxError,
    },

    /// The fixture folder passed to `load` does not exist.
    #[error("Fixture folder not found: {}", .0.display())]
    MissingFolder(PathBuf),

    /// A fixture file exists but could not be read.
    #[error("Failed to read fixture '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The session is not usable as configured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A failure reported by one adapter of a session.
    #[error("Adapter '{adapter}' failed: {source}")]
    Adapter {
        adapter: String,
        #[source]
        source: Box<FixtureError>,
    },

    /// Several concurrently issued operations failed.
    #[error("{} operations failed: {}", .0.len(), join_messages(.0))]
    Multiple(Vec<FixtureError>),
}

impl FixtureError {
    pub fn write(table: impl Into<String>, operation: Operation, source: impl Into<BoxError>) -> Self {
        FixtureError::Write {
            table: table.into(),
            operation,
            source: source.into(),
        }
    }

    pub fn parse(
        table: impl Into<String>,
        path: impl Into<PathBuf>,
        source: impl Into<BoxError>,
    ) -> Self {
        FixtureError::FixtureParse {
            table: table.into(),
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn discovery(operation: Operation, source: impl Into<BoxError>) -> Self {
        FixtureError::SchemaDiscovery {
            operation,
            source: source.into(),
        }
    }

    /// Every leaf error, flattening `Multiple` and unwrapping `Adapter` tags.
    pub fn leaves(&self) -> Vec<&FixtureError> {
        match self {
            FixtureError::Multiple(errors) => errors.iter().flat_map(|e| e.leaves()).collect(),
            FixtureError::Adapter { source, .. } => source.leaves(),
            other => vec![other],
        }
    }
}

fn join_messages(errors: &[FixtureError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_names_table_and_operation() {
        let err = FixtureError::write("posts", Operation::TruncateDelete, "throttled");
        assert_eq!(
            err.to_string(),
            "truncate-delete failed for table 'posts': throttled"
        );
    }

    #[test]
    fn test_multiple_lists_every_failure() {
        let err = FixtureError::Multiple(vec![
            FixtureError::write("a", Operation::LoadPut, "boom"),
            FixtureError::Configuration("no adapters".into()),
        ]);
        let message = err.to_string();
        assert!(message.starts_with("2 operations failed"));
        assert!(message.contains("load-put failed for table 'a'"));
        assert!(message.contains("no adapters"));
    }

    #[test]
    fn test_leaves_flattens_nested_errors() {
        let err = FixtureError::Multiple(vec![
            FixtureError::Adapter {
                adapter: "mysql".into(),
                source: Box::new(FixtureError::Multiple(vec![
                    FixtureError::write("users", Operation::Insert, "dup"),
                    FixtureError::write("posts", Operation::Insert, "dup"),
                ])),
            },
            FixtureError::MissingFolder(PathBuf::from("/nope")),
        ]);
        assert_eq!(err.leaves().len(), 3);
    }
}
