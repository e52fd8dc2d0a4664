use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;
use tracing::info;

use crate::core::{Engine, SourceOutcome};

#[derive(Parser)]
#[command(name = "fieldtrace")]
#[command(about = "Field-level data lineage for Java codebases")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract one attribute record per field and rebuild the index
    Extract {
        /// Source directories, one batch each (defaults to configured source_dirs)
        sources: Vec<PathBuf>,

        /// Output directory for attribute documents
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the batch id prefix
        #[arg(long)]
        batch_prefix: Option<String>,

        /// Also emit records for classes without fields
        #[arg(long)]
        class_records: bool,
    },

    /// Rebuild the index from existing attribute documents
    Index {
        /// Output directory holding the documents
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the fields discovered in a single file
    Fields {
        /// Java source file
        file: PathBuf,
    },

    /// Write a default fieldtrace.toml
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub async fn execute(self, mut engine: Engine) -> Result<()> {
        match self.command {
            Commands::Extract { sources, output, batch_prefix, class_records } => {
                if let Some(prefix) = batch_prefix {
                    engine.set_batch_prefix(prefix);
                }
                let summary = engine.extract(sources, output, class_records).await?;

                for report in &summary.sources {
                    let status = match report.outcome {
                        SourceOutcome::Extracted { records } => format!("{} record(s)", records),
                        SourceOutcome::Empty => "no records (unprocessed)".to_string(),
                        SourceOutcome::Missing => "missing".to_string(),
                    };
                    info!(
                        "{} [{}]: {} ({} file(s) scanned, {} skipped)",
                        report.source.display(),
                        report.batch_id.as_deref().unwrap_or("-"),
                        status,
                        report.files_scanned,
                        report.files_skipped
                    );
                }
                info!("Index: {} ({} attribute(s))", summary.index_path.display(), summary.index_entries);
                Ok(())
            }
            Commands::Index { output } => {
                engine.rebuild_index(output).await?;
                Ok(())
            }
            Commands::Fields { file } => {
                println!("{}", engine.fields(&file).await?);
                Ok(())
            }
            Commands::Init { path, force } => {
                engine.init(path, force).await?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extract_with_sources() {
        let cli = Cli::parse_from([
            "fieldtrace", "extract", "a", "b", "--output", "out", "--batch-prefix", "RUN", "--class-records",
        ]);

        match cli.command {
            Commands::Extract { sources, output, batch_prefix, class_records } => {
                assert_eq!(sources, vec![PathBuf::from("a"), PathBuf::from("b")]);
                assert_eq!(output, Some(PathBuf::from("out")));
                assert_eq!(batch_prefix.as_deref(), Some("RUN"));
                assert!(class_records);
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["fieldtrace", "index", "--verbose", "--config", "ft.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("ft.toml")));
    }
}
