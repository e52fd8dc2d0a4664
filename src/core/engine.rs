// src/core/engine.rs
use std::path::{Path, PathBuf};
use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::FieldtraceError;
use super::discoverer::FieldDiscoverer;
use super::extractor::AttributeExtractor;
use super::output::{IndexBuilder, RecordWriter};
use super::record::{ExtractedRecord, RecordAssembler};
use super::revision::detect_revision;
use super::snapshot::{FileKind, ProjectSnapshot, SourceFile};

/// What happened to one input source during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// Records were extracted and written
    Extracted { records: usize },
    /// The source was scanned but produced no records; it can be retried
    Empty,
    /// The source directory does not exist
    Missing,
}

#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source: PathBuf,
    pub batch_id: Option<String>,
    pub outcome: SourceOutcome,
    pub files_scanned: usize,
    pub files_skipped: usize,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub sources: Vec<SourceReport>,
    pub index_path: PathBuf,
    pub index_entries: usize,
}

impl RunSummary {
    pub fn records_written(&self) -> usize {
        self.sources.iter()
            .map(|s| match s.outcome {
                SourceOutcome::Extracted { records } => records,
                _ => 0,
            })
            .sum()
    }
}

/// Main orchestration engine for Fieldtrace
pub struct Engine {
    config: Config,
}

impl Engine {
    /// Create a new engine instance from a config file (or defaults)
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        debug!("Loaded configuration: {:?}", config);
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        if config.scanning.threads > 0 {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(config.scanning.threads)
                .build_global()
            {
                warn!("⚠️ Could not configure {} scanning thread(s): {}", config.scanning.threads, e);
            }
        }
        Self { config }
    }

    pub fn set_batch_prefix(&mut self, prefix: impl Into<String>) {
        self.config.project.batch_prefix = prefix.into();
    }

    /// Extract every source directory as its own batch, then rebuild the index
    pub async fn extract(
        &self,
        sources: Vec<PathBuf>,
        output: Option<PathBuf>,
        class_records: bool,
    ) -> Result<RunSummary> {
        let sources = if sources.is_empty() {
            self.config.project.source_dirs.clone()
        } else {
            sources
        };
        let output_dir = output.unwrap_or_else(|| self.config.output.output_dir.clone());
        let class_records = class_records || self.config.output.emit_class_records;

        if !sources.iter().any(|s| s.is_dir()) {
            let listed = sources.iter()
                .map(|s| s.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(FieldtraceError::NoSources(
                if listed.is_empty() { "no source directories configured".to_string() } else { listed }
            ).into());
        }

        info!("🔍 Starting attribute extraction for {} source(s)", sources.len());
        info!("Output: {}", output_dir.display());

        // The index is written even when no source yields a record
        tokio::fs::create_dir_all(&output_dir).await?;

        let mut reports = Vec::new();
        let mut batch_counter = 1;

        for source in sources {
            if !source.is_dir() {
                warn!("⚠️ Source {} does not exist, skipping", source.display());
                reports.push(SourceReport {
                    source,
                    batch_id: None,
                    outcome: SourceOutcome::Missing,
                    files_scanned: 0,
                    files_skipped: 0,
                });
                continue;
            }

            let batch_id = format!("{}_{}", self.config.project.batch_prefix, batch_counter);
            batch_counter += 1;

            let report = self.extract_source(source, batch_id, &output_dir, class_records).await?;
            reports.push(report);
        }

        let (index_path, index_entries) = IndexBuilder::new(&self.config.output, &output_dir)
            .write()
            .await?;
        info!("📚 Index with {} attribute(s) written to {}", index_entries, index_path.display());

        let summary = RunSummary {
            sources: reports,
            index_path,
            index_entries,
        };
        info!("🎉 Extraction complete: {} record(s) written", summary.records_written());

        Ok(summary)
    }

    async fn extract_source(
        &self,
        source: PathBuf,
        batch_id: String,
        output_dir: &Path,
        class_records: bool,
    ) -> Result<SourceReport> {
        info!("📖 Processing {} as {}", source.display(), batch_id);

        let config = self.config.clone();
        let root = source.clone();
        let batch = batch_id.clone();

        // Snapshot and extraction are CPU-bound; keep them off the async workers
        let (records, files_scanned, files_skipped) = tokio::task::spawn_blocking(
            move || -> crate::error::Result<(Vec<ExtractedRecord>, usize, usize)> {
                let snapshot = ProjectSnapshot::build(&root, &config)?;
                if snapshot.is_empty() {
                    warn!("⚠️ No source or markup files under {}", snapshot.root().display());
                }
                info!(
                    "Found {} source file(s) and {} markup file(s), {} skipped",
                    snapshot.source_count(),
                    snapshot.files().len() - snapshot.source_count(),
                    snapshot.skipped()
                );

                let assembler = RecordAssembler::new(batch, detect_revision(&root));
                let records = AttributeExtractor::new(&snapshot, assembler)
                    .with_class_records(class_records)
                    .extract_all()?;

                Ok((records, snapshot.files().len(), snapshot.skipped()))
            },
        )
        .await
        .map_err(|e| FieldtraceError::Task(e.to_string()))??;

        if records.is_empty() {
            warn!("⚠️ No attributes extracted from {}; source left unprocessed", source.display());
            return Ok(SourceReport {
                source,
                batch_id: Some(batch_id),
                outcome: SourceOutcome::Empty,
                files_scanned,
                files_skipped,
            });
        }

        let writer = RecordWriter::new(&self.config.output, output_dir);
        let written = writer.write_all(&records).await?;
        info!("✅ {}: {} record(s) written to {}", batch_id, written, output_dir.display());

        Ok(SourceReport {
            source,
            batch_id: Some(batch_id),
            outcome: SourceOutcome::Extracted { records: written },
            files_scanned,
            files_skipped,
        })
    }

    /// Re-aggregate existing documents into the index
    pub async fn rebuild_index(&self, output: Option<PathBuf>) -> Result<(PathBuf, usize)> {
        let output_dir = output.unwrap_or_else(|| self.config.output.output_dir.clone());
        info!("📚 Rebuilding index in {}", output_dir.display());

        let result = IndexBuilder::new(&self.config.output, &output_dir).write().await?;
        info!("✅ Index contains {} attribute(s)", result.1);
        Ok(result)
    }

    /// Discovered declarations of a single file, as pretty JSON
    pub async fn fields(&self, file: &Path) -> Result<String> {
        let content = tokio::fs::read_to_string(file).await?;
        let source = SourceFile::new(file.to_string_lossy().replace('\\', "/"), FileKind::Source, content);
        let discovery = FieldDiscoverer::discover(&source);

        Ok(serde_json::to_string_pretty(&serde_json::json!({
            "file": source,
            "discovery": discovery,
        }))?)
    }

    /// Write a default configuration file
    pub async fn init(&self, path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
        let target_dir = match path {
            Some(path) => path,
            None => std::env::current_dir()?,
        };
        let config_path = target_dir.join("fieldtrace.toml");
        info!("Initializing Fieldtrace in: {}", target_dir.display());

        if config_path.exists() && !force {
            return Err(FieldtraceError::Config(format!(
                "{} already exists (use --force to overwrite)",
                config_path.display()
            )).into());
        }

        tokio::fs::create_dir_all(&target_dir).await?;
        Config::default().save(&config_path)?;
        info!("✅ Wrote {}", config_path.display());
        Ok(config_path)
    }
}
