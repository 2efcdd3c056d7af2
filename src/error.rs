use polars::prelude::PolarsError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CnvError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Missing values found in {} (columns: {})", path.display(), columns.join(", "))]
    MissingValues { path: PathBuf, columns: Vec<String> },

    #[error("Could not parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Column '{column}' not found in {}", path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("Output file {} is missing after write", path.display())]
    OutputMissing { path: PathBuf },

    #[error("Invalid parameter: {name} = {value}, {message}")]
    InvalidParameter {
        name: String,
        value: String,
        message: String,
    },
}

/// Type alias for Result with CnvError
pub type Result<T> = std::result::Result<T, CnvError>;

impl CnvError {
    /// Create a new Parse error for the table at `path`
    pub fn parse(path: impl AsRef<Path>, message: impl ToString) -> Self {
        CnvError::Parse {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Create a new MissingColumn error
    pub fn missing_column(column: impl Into<String>, path: impl AsRef<Path>) -> Self {
        CnvError::MissingColumn {
            column: column.into(),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a new InvalidParameter error
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        CnvError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            message: message.into(),
        }
    }
}
