use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum KiraError {
    #[error("invalid study source: {0}")]
    InvalidSource(String),

    #[error("study metadata request failed: {0}")]
    StudyHttp(String),

    #[error("study metadata server returned status {status}: {message}")]
    StudyStatus { status: u16, message: String },

    #[error("failed to decode study metadata: {0}")]
    StudyDecode(String),

    #[error("failed to read study metadata from {0}")]
    SourceRead(PathBuf),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl KiraError {
    /// Short label used in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            KiraError::StudyHttp(_) | KiraError::StudyStatus { .. } | KiraError::SourceRead(_) => {
                "transport"
            }
            KiraError::StudyDecode(_) => "decode",
            KiraError::InvalidSource(_) => "source",
            KiraError::ConfigRead(_) | KiraError::ConfigParse(_) => "config",
            KiraError::Filesystem(_) => "filesystem",
        }
    }
}
