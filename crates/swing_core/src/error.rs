use thiserror::Error;

/// Dataset load failure. Fatal for the view that needed the data.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    #[error("Malformed dataset: {0}")]
    Malformed(String),

    #[error("Dataset contains no parseable rows: {source_name}")]
    Empty { source_name: String },

    #[error("Unsupported dataset format: {path}")]
    UnsupportedFormat { path: String },

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl LoadError {
    /// Whether pointing the loader at another copy of the data could help.
    ///
    /// Nothing retries automatically; the dashboard stays unready either way.
    pub fn is_recoverable(&self) -> bool {
        match self {
            LoadError::Io(_) => true,
            LoadError::UnsupportedFormat { .. } => true,
            LoadError::Csv(_) => false,
            LoadError::Json(_) => false,
            LoadError::MissingColumn { .. } => false,
            LoadError::Malformed(_) => false,
            LoadError::Empty { .. } => false,
            LoadError::Snapshot(_) => false,
        }
    }
}

impl From<rmp_serde::encode::Error> for LoadError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        LoadError::Snapshot(format!("MessagePack encode failed: {err}"))
    }
}

impl From<rmp_serde::decode::Error> for LoadError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        LoadError::Snapshot(format!("MessagePack decode failed: {err}"))
    }
}

impl From<lz4_flex::block::DecompressError> for LoadError {
    fn from(err: lz4_flex::block::DecompressError) -> Self {
        LoadError::Snapshot(format!("LZ4 decompress failed: {err}"))
    }
}

/// Configuration file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, LoadError>;
