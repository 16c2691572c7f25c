use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{AppResult, StateError};

/// The three persisted bundle-hash records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Unconfirmed,
    Failed,
    Confirmed,
}

impl RecordKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            RecordKind::Unconfirmed => "unconfirmed.json",
            RecordKind::Failed => "failed.json",
            RecordKind::Confirmed => "confirmed.json",
        }
    }
}

/// Durable storage for the bundle-hash records. A write replaces the whole
/// record; readers never observe a partial rewrite.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self, record: RecordKind) -> AppResult<Vec<String>>;
    async fn write(&self, record: RecordKind, hashes: &HashSet<String>) -> AppResult<()>;
}

/// `StateStore` over three JSON files in a directory. Rewrites go through a
/// temp file and a rename so a crash never truncates a record.
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn io_err(record: RecordKind, source: std::io::Error) -> StateError {
        StateError::Io {
            record: record.file_name().to_string(),
            source,
        }
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self, record: RecordKind) -> AppResult<Vec<String>> {
        let path = self.dir.join(record.file_name());
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            // A record that was never written is an empty record
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_err(record, e).into()),
        };
        let hashes: Vec<String> =
            serde_json::from_slice(&raw).map_err(|source| StateError::Corrupt {
                record: record.file_name().to_string(),
                source,
            })?;
        Ok(hashes)
    }

    async fn write(&self, record: RecordKind, hashes: &HashSet<String>) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Self::io_err(record, e))?;

        let mut ordered: Vec<&String> = hashes.iter().collect();
        ordered.sort();
        let raw = serde_json::to_vec_pretty(&ordered).map_err(|source| StateError::Corrupt {
            record: record.file_name().to_string(),
            source,
        })?;

        let path = self.dir.join(record.file_name());
        let tmp = self.dir.join(format!(".{}.tmp", record.file_name()));
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| Self::io_err(record, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| Self::io_err(record, e))?;
        Ok(())
    }
}
