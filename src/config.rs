use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FieldtraceError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Source scanning configuration
    pub scanning: ScanningConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Source directories to analyze, one batch each
    pub source_dirs: Vec<PathBuf>,

    /// Paths to skip while walking a source directory (gitignore syntax)
    pub ignore_patterns: Vec<String>,

    /// Prefix for generated batch identifiers (`BATCH` -> `BATCH_1`, `BATCH_2`, ...)
    pub batch_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Extensions of source files that declare and reference fields
    pub source_extensions: Vec<String>,

    /// Extensions of markup files scanned for UI references
    pub markup_extensions: Vec<String>,

    /// Maximum file size to read (in bytes)
    pub max_file_size: usize,

    /// Worker threads for parallel scanning (0 = one per core)
    pub threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving one JSON document per attribute
    pub output_dir: PathBuf,

    /// File name of the aggregated index inside `output_dir`
    pub index_file: String,

    /// Pretty-print JSON documents
    pub pretty: bool,

    /// Also emit a record for classes that declare no fields
    pub emit_class_records: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Unnamed Project".to_string(),
            source_dirs: vec![PathBuf::from("src")],
            ignore_patterns: vec![
                "target/".to_string(),
                "node_modules/".to_string(),
                ".git/".to_string(),
                "*.tmp".to_string(),
            ],
            batch_prefix: "BATCH".to_string(),
        }
    }
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            source_extensions: vec!["java".to_string()],
            markup_extensions: vec!["html".to_string()],
            max_file_size: 4 * 1024 * 1024, // 4MB
            threads: 0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("attributes"),
            index_file: "index.json".to_string(),
            pretty: true,
            emit_class_records: false,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| FieldtraceError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FieldtraceError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                // Try common config file locations
                let candidates = [
                    "Fieldtrace.toml",
                    "fieldtrace.toml",
                    ".fieldtrace.toml",
                ];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    /// Check whether a path has one of the configured source extensions
    pub fn is_source_file(&self, path: &Path) -> bool {
        Self::has_extension(path, &self.scanning.source_extensions)
    }

    /// Check whether a path has one of the configured markup extensions
    pub fn is_markup_file(&self, path: &Path) -> bool {
        Self::has_extension(path, &self.scanning.markup_extensions)
    }

    fn has_extension(path: &Path, extensions: &[String]) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}
