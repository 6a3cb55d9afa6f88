use crate::polar::TableError;
use std::io;
use thiserror::Error;

pub type BuilderResult<T> = Result<T, BuilderError>;

/// Errors raised while declaring, computing or wiring subsystem outputs.
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("contract violation in {builder}, output {output}: {detail}")]
    ContractViolation {
        builder: String,
        output: String,
        detail: String,
    },

    #[error("no subsystem publishes {0}")]
    MissingConnection(String),

    #[error("invalid phase info: {0}")]
    InvalidPhaseInfo(String),

    #[error("polar table error: {0}")]
    Table(#[from] TableError),

    #[error("phase info parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl BuilderError {
    pub(crate) fn violation(builder: &str, output: &str, detail: impl Into<String>) -> Self {
        BuilderError::ContractViolation {
            builder: builder.to_string(),
            output: output.to_string(),
            detail: detail.into(),
        }
    }
}
