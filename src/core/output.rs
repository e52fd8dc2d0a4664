// src/core/output.rs
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::OutputConfig;
use crate::error::{FieldtraceError, Result};
use super::record::ExtractedRecord;

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<Vec<u8>> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    Ok(bytes)
}

/// Writes one JSON document per record, keyed by attribute name
pub struct RecordWriter {
    output_dir: PathBuf,
    pretty: bool,
}

impl RecordWriter {
    pub fn new(config: &OutputConfig, output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            pretty: config.pretty,
        }
    }

    pub fn record_path(&self, attribute_name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.json", attribute_name))
    }

    /// Write a record, replacing any earlier record with the same name
    pub async fn write(&self, record: &ExtractedRecord) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let path = self.record_path(record.attribute_name());
        if tokio::fs::try_exists(&path).await? {
            debug!("Overwriting {}", path.display());
        }
        tokio::fs::write(&path, to_json(record, self.pretty)?).await?;
        Ok(path)
    }

    /// Write records in order; returns how many documents were written non-empty
    pub async fn write_all(&self, records: &[ExtractedRecord]) -> Result<usize> {
        let mut written = 0;
        for record in records {
            let path = self.write(record).await?;
            if tokio::fs::metadata(&path).await?.len() > 0 {
                written += 1;
            }
        }
        Ok(written)
    }
}

/// Aggregates every per-attribute document into a single index
pub struct IndexBuilder {
    output_dir: PathBuf,
    index_file: String,
    pretty: bool,
}

impl IndexBuilder {
    pub fn new(config: &OutputConfig, output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            index_file: config.index_file.clone(),
            pretty: config.pretty,
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.output_dir.join(&self.index_file)
    }

    /// Read every document back and key it by `attributeName` (file stem when absent).
    ///
    /// Unreadable or malformed documents are skipped.
    pub async fn collect(&self) -> Result<BTreeMap<String, Value>> {
        if !self.output_dir.is_dir() {
            return Err(FieldtraceError::FileSystem(format!(
                "Output directory {} does not exist",
                self.output_dir.display()
            )));
        }

        let mut documents: Vec<PathBuf> = WalkDir::new(&self.output_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
            .filter(|path| path.file_name().and_then(|n| n.to_str()) != Some(self.index_file.as_str()))
            .collect();
        documents.sort();

        let mut index = BTreeMap::new();
        for path in documents {
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Skipping unreadable document {}: {}", path.display(), e);
                    continue;
                }
            };
            let data: Value = match serde_json::from_slice(&bytes) {
                Ok(data) => data,
                Err(e) => {
                    warn!("Skipping malformed document {}: {}", path.display(), e);
                    continue;
                }
            };

            let key = data.get("attributeName")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .or_else(|| path.file_stem().map(|s| s.to_string_lossy().to_string()))
                .unwrap_or_default();
            index.insert(key, data);
        }

        Ok(index)
    }

    /// Collect and write the index; returns its path and entry count
    pub async fn write(&self) -> Result<(PathBuf, usize)> {
        let index = self.collect().await?;
        let path = self.index_path();
        tokio::fs::write(&path, to_json(&index, self.pretty)?).await?;
        Ok((path, index.len()))
    }
}
