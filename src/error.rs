use thiserror::Error;

/// Main error type for Fieldtrace operations
#[derive(Error, Debug)]
pub enum FieldtraceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("No input sources found: {0}")]
    NoSources(String),

    #[error("Extraction task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, FieldtraceError>;
