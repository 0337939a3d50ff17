//! Error types for the merge pipeline.

use thiserror::Error;

use docmerge_data::DataError;
use docmerge_ooxml::OoxmlError;

/// Result type for merge operations
pub type Result<T> = std::result::Result<T, MergeError>;

/// Errors that can occur while extracting placeholders or rendering a batch
#[derive(Debug, Error)]
pub enum MergeError {
    /// The template could not be opened or has malformed template syntax
    #[error("Template error: {0}")]
    Template(#[from] OoxmlError),

    /// The record table could not be read
    #[error("Table error: {0}")]
    Table(#[from] DataError),

    /// A row failed to render; `row` is 1-based
    #[error("Row {row} failed to render: {source}")]
    Render {
        row: usize,
        #[source]
        source: OoxmlError,
    },

    /// Invalid configuration file
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error writing the output archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl MergeError {
    /// Row ordinal of a render failure
    pub fn row(&self) -> Option<usize> {
        match self {
            MergeError::Render { row, .. } => Some(*row),
            _ => None,
        }
    }
}
