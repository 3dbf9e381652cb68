//! Error type shared by every report operation.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("report has no data or no columns")]
    EmptyInput,

    #[error("CSV file not found: {0}")]
    FileNotFound(String),

    #[error("unable to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings: {0}")]
    Settings(String),

    #[error("activity store error: {0}")]
    Store(String),

    #[error("no report registered under slug `{0}`")]
    UnknownReport(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
