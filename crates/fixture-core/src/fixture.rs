//! Fixture file resolution and reading.
//!
//! A fixture folder holds at most one file per table and representation,
//! named `{prefix}.{table}.{extension}`. Each adapter lists the
//! representations it understands in priority order and the first one that
//! exists on disk wins.

use crate::error::{FixtureError, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One fixture row: field name to value.
pub type Record = Map<String, Value>;

/// How a fixture file encodes its table contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureKind {
    /// Store-native dump (DynamoDB attribute-value JSON, MySQL script).
    NativeDump,
    /// Portable dump not tied to one store flavour (plain SQL script).
    GenericDump,
    /// Plain JSON records written for this store.
    RawNative,
    /// Plain JSON records shared across stores.
    RawGeneric,
}

impl FixtureKind {
    /// Whether the file is a dump executed or decoded in the store's own format.
    pub fn is_dump(self) -> bool {
        matches!(self, FixtureKind::NativeDump | FixtureKind::GenericDump)
    }
}

/// A candidate file naming convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureCandidate {
    pub kind: FixtureKind,
    pub prefix: String,
    pub extension: String,
}

impl FixtureCandidate {
    pub fn new(kind: FixtureKind, prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            kind,
            prefix: prefix.into(),
            extension: extension.into(),
        }
    }

    pub fn filename(&self, table: &str) -> String {
        format!("{}.{}.{}", self.prefix, table, self.extension)
    }
}

/// A fixture file chosen for a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureFile {
    pub table: String,
    pub path: PathBuf,
    pub kind: FixtureKind,
}

/// Priority-ordered list of candidate naming conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureResolver {
    candidates: Vec<FixtureCandidate>,
}

impl FixtureResolver {
    pub fn new(candidates: Vec<FixtureCandidate>) -> Self {
        Self { candidates }
    }

    /// `dynamodb.<T>.json`, then `raw-dynamodb.<T>.json`, then `raw.<T>.json`.
    pub fn dynamodb() -> Self {
        Self::new(vec![
            FixtureCandidate::new(FixtureKind::NativeDump, "dynamodb", "json"),
            FixtureCandidate::new(FixtureKind::RawNative, "raw-dynamodb", "json"),
            FixtureCandidate::new(FixtureKind::RawGeneric, "raw", "json"),
        ])
    }

    /// `mysql.<T>.sql`, `generic.<T>.sql`, `raw-sql.<T>.json`, then `raw.<T>.json`.
    pub fn mysql() -> Self {
        Self::new(vec![
            FixtureCandidate::new(FixtureKind::NativeDump, "mysql", "sql"),
            FixtureCandidate::new(FixtureKind::GenericDump, "generic", "sql"),
            FixtureCandidate::new(FixtureKind::RawNative, "raw-sql", "json"),
            FixtureCandidate::new(FixtureKind::RawGeneric, "raw", "json"),
        ])
    }

    pub fn candidates(&self) -> &[FixtureCandidate] {
        &self.candidates
    }

    /// Find the highest-priority fixture file for `table` under `folder`.
    pub async fn resolve(&self, folder: &Path, table: &str) -> Result<Option<FixtureFile>> {
        for candidate in &self.candidates {
            let path = folder.join(candidate.filename(table));
            let exists = tokio::fs::try_exists(&path)
                .await
                .map_err(|source| FixtureError::Io {
                    path: path.clone(),
                    source,
                })?;
            if exists {
                debug!("Resolved fixture {} for table '{}'", path.display(), table);
                return Ok(Some(FixtureFile {
                    table: table.to_string(),
                    path,
                    kind: candidate.kind,
                }));
            }
        }
        Ok(None)
    }
}

/// Fail with [`FixtureError::MissingFolder`] unless `folder` is a directory.
pub async fn ensure_folder(folder: &Path) -> Result<()> {
    match tokio::fs::metadata(folder).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(FixtureError::MissingFolder(folder.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(FixtureError::MissingFolder(folder.to_path_buf()))
        }
        Err(source) => Err(FixtureError::Io {
            path: folder.to_path_buf(),
            source,
        }),
    }
}

/// Read a fixture file holding a JSON array of objects.
pub async fn read_records(file: &FixtureFile) -> Result<Vec<Record>> {
    let contents = read_bytes(&file.path).await?;
    let value: Value = serde_json::from_slice(&contents)
        .map_err(|e| FixtureError::parse(&file.table, &file.path, e))?;

    let Value::Array(items) = value else {
        return Err(FixtureError::parse(
            &file.table,
            &file.path,
            "expected a JSON array of objects",
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(FixtureError::parse(
                &file.table,
                &file.path,
                format!("item {i} is not an object: {other}"),
            )),
        })
        .collect()
}

/// Read a fixture file holding a SQL script.
pub async fn read_script(file: &FixtureFile) -> Result<String> {
    let contents = read_bytes(&file.path).await?;
    String::from_utf8(contents).map_err(|e| FixtureError::parse(&file.table, &file.path, e))
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str, contents: &str) {
        std::fs::write(dir.path().join(name), contents).unwrap();
    }

    #[tokio::test]
    async fn test_resolve_prefers_native_dump() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "raw.posts.json", "[]");
        touch(&dir, "raw-dynamodb.posts.json", "[]");
        touch(&dir, "dynamodb.posts.json", "[]");

        let file = FixtureResolver::dynamodb()
            .resolve(dir.path(), "posts")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(file.kind, FixtureKind::NativeDump);
        assert_eq!(file.path, dir.path().join("dynamodb.posts.json"));
    }

    #[tokio::test]
    async fn test_resolve_sql_script_beats_raw_json() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "raw.users.json", "[]");
        touch(&dir, "mysql.users.sql", "INSERT INTO users VALUES (1);");

        let file = FixtureResolver::mysql()
            .resolve(dir.path(), "users")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(file.kind, FixtureKind::NativeDump);
        assert!(file.kind.is_dump());
    }

    #[tokio::test]
    async fn test_resolve_falls_through_to_generic_json() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "raw.users.json", "[]");
        touch(&dir, "raw.posts.json", "[]");

        let file = FixtureResolver::mysql()
            .resolve(dir.path(), "users")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(file.kind, FixtureKind::RawGeneric);
    }

    #[tokio::test]
    async fn test_resolve_none_when_no_candidate_exists() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "raw.other.json", "[]");

        let file = FixtureResolver::dynamodb()
            .resolve(dir.path(), "posts")
            .await
            .unwrap();
        assert!(file.is_none());
    }

    #[tokio::test]
    async fn test_custom_candidates() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "seed-posts.json", "[]");
        touch(&dir, "fixture.posts.ndjson", "[]");

        let resolver = FixtureResolver::new(vec![FixtureCandidate::new(
            FixtureKind::RawGeneric,
            "fixture",
            "ndjson",
        )]);
        let file = resolver.resolve(dir.path(), "posts").await.unwrap().unwrap();
        assert_eq!(file.path, dir.path().join("fixture.posts.ndjson"));
    }

    #[tokio::test]
    async fn test_ensure_folder() {
        let dir = TempDir::new().unwrap();
        assert!(ensure_folder(dir.path()).await.is_ok());

        let missing = dir.path().join("missing");
        assert!(matches!(
            ensure_folder(&missing).await,
            Err(FixtureError::MissingFolder(p)) if p == missing
        ));

        touch(&dir, "file.json", "[]");
        assert!(matches!(
            ensure_folder(&dir.path().join("file.json")).await,
            Err(FixtureError::MissingFolder(_))
        ));
    }

    #[tokio::test]
    async fn test_read_records() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "raw.posts.json", r#"[{"pk":"post#1","title":"hi"},{"pk":"post#2"}]"#);
        let file = FixtureResolver::dynamodb()
            .resolve(dir.path(), "posts")
            .await
            .unwrap()
            .unwrap();

        let records = read_records(&file).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["title"], "hi");
    }

    #[tokio::test]
    async fn test_read_records_rejects_malformed_content() {
        let dir = TempDir::new().unwrap();
        let file = FixtureFile {
            table: "posts".into(),
            path: dir.path().join("raw.posts.json"),
            kind: FixtureKind::RawGeneric,
        };

        for contents in [r#"{"pk":"x"}"#, r#"[1, 2]"#, "not json"] {
            touch(&dir, "raw.posts.json", contents);
            let err = read_records(&file).await.unwrap_err();
            assert!(
                matches!(err, FixtureError::FixtureParse { ref table, .. } if table == "posts"),
                "{contents}: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_read_script() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "generic.users.sql", "DELETE FROM users;\nINSERT INTO users VALUES (1);");
        let file = FixtureResolver::mysql()
            .resolve(dir.path(), "users")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(file.kind, FixtureKind::GenericDump);

        let script = read_script(&file).await.unwrap();
        assert!(script.contains("INSERT INTO users"));
    }
}
