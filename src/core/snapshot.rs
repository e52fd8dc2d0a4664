// src/core/snapshot.rs
use std::path::{Path, PathBuf};
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{FieldtraceError, Result};
use super::layer::Layer;
use super::patterns;

/// How a file participates in reference scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Declares fields and references them in code
    Source,
    /// Markup that can bind to fields (UI cross-reference only)
    Markup,
}

/// One pre-read project file plus the facts every field scan needs from it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    /// Path relative to the project root, `/`-separated
    pub relative_path: String,

    pub kind: FileKind,

    /// Content hash for change detection
    pub content_hash: String,

    /// First `class` name in the file, else the file stem
    pub class_name: String,

    pub file_stem: String,

    pub file_name: String,

    /// Layer inferred from `relative_path`
    pub layer: Layer,

    /// ORM annotation names anywhere in the file, duplicates kept
    pub orm_annotations: Vec<String>,

    /// REST endpoint annotation names anywhere in the file
    pub rest_annotations: Vec<String>,

    /// `client.verb` external HTTP calls anywhere in the file
    pub external_calls: Vec<String>,

    #[serde(skip)]
    pub content: String,
}

impl SourceFile {
    pub fn new(relative_path: impl Into<String>, kind: FileKind, content: impl Into<String>) -> Self {
        let relative_path = relative_path.into();
        let content = content.into();

        let name_path = Path::new(&relative_path);
        let file_stem = name_path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let file_name = name_path.file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let (class_name, orm_annotations, rest_annotations, external_calls) = match kind {
            FileKind::Source => (
                patterns::first_class_name(&content).unwrap_or_else(|| file_stem.clone()),
                patterns::all_captures(&patterns::ORM_ANNOTATION, &content),
                patterns::all_captures(&patterns::REST_ANNOTATION, &content),
                patterns::EXTERNAL_CALL.captures_iter(&content)
                    .map(|caps| format!("{}.{}", &caps[1], &caps[2]))
                    .collect(),
            ),
            FileKind::Markup => (file_stem.clone(), Vec::new(), Vec::new(), Vec::new()),
        };

        Self {
            layer: Layer::classify(&relative_path),
            content_hash: calculate_hash(&content),
            relative_path,
            kind,
            class_name,
            file_stem,
            file_name,
            orm_annotations,
            rest_annotations,
            external_calls,
            content,
        }
    }

    pub fn lines(&self) -> Vec<&str> {
        self.content.lines().collect()
    }
}

/// Immutable view of every readable project file, read once per run
#[derive(Debug, Clone)]
pub struct ProjectSnapshot {
    root: PathBuf,
    files: Vec<SourceFile>,
    skipped: usize,
}

impl ProjectSnapshot {
    /// Walk `root` and read every source and markup file.
    ///
    /// Unreadable, oversized and non-UTF-8 files are skipped and counted; they
    /// never abort the walk.
    pub fn build<P: AsRef<Path>>(root: P, config: &Config) -> Result<Self> {
        let root = root.as_ref();

        let mut overrides = OverrideBuilder::new(root);
        for pattern in &config.project.ignore_patterns {
            overrides.add(&format!("!{}", pattern))
                .map_err(|e| FieldtraceError::Config(format!("Invalid ignore pattern '{}': {}", pattern, e)))?;
        }
        let overrides = overrides.build()
            .map_err(|e| FieldtraceError::Config(e.to_string()))?;

        // Use ignore crate to respect .gitignore and custom patterns
        let walker = WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(true)
            .overrides(overrides)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut files = Vec::new();
        let mut skipped = 0;

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    skipped += 1;
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let kind = if config.is_source_file(path) {
                FileKind::Source
            } else if config.is_markup_file(path) {
                FileKind::Markup
            } else {
                continue;
            };

            match Self::read_file(path, config.scanning.max_file_size) {
                Ok(content) => {
                    let relative = path.strip_prefix(root).unwrap_or(path);
                    let relative = relative.to_string_lossy().replace('\\', "/");
                    let file = SourceFile::new(relative, kind, content);
                    debug!("Read {} ({}, {})", file.relative_path, file.layer, &file.content_hash[..8]);
                    files.push(file);
                }
                Err(e) => {
                    debug!("Skipping {}: {}", path.display(), e);
                    skipped += 1;
                }
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            files,
            skipped,
        })
    }

    /// Build a snapshot from files already in memory
    #[cfg(test)]
    pub fn from_files<P: AsRef<Path>>(root: P, files: Vec<SourceFile>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            files,
            skipped: 0,
        }
    }

    fn read_file(path: &Path, max_file_size: usize) -> Result<String> {
        let metadata = std::fs::metadata(path)?;
        if metadata.len() as usize > max_file_size {
            return Err(FieldtraceError::FileSystem(
                format!("File {} exceeds maximum size limit", path.display())
            ));
        }
        Ok(std::fs::read_to_string(path)?)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn source_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().filter(|f| f.kind == FileKind::Source)
    }

    pub fn source_count(&self) -> usize {
        self.source_files().count()
    }

    /// Files that could not be read while building the snapshot
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Calculate SHA256 hash of content
fn calculate_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
