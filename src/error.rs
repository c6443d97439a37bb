//! Site Errors

use thiserror::Error;

pub type SiteResult<T> = Result<T, SiteError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SiteError {
    #[error("failed to fetch {path}: {reason}")]
    Fetch { path: String, reason: String },

    #[error("{path} responded with HTTP {status}")]
    HttpStatus { path: String, status: u16 },

    #[error("fetching {path} timed out after {timeout_ms}ms")]
    Timeout { path: String, timeout_ms: u32 },

    #[error("mount point #{0} not found")]
    MissingMount(String),

    #[error("invalid site config: {0}")]
    Config(String),

    #[error("submission failed: {0}")]
    Submission(String),
}

impl SiteError {
    pub fn fetch(path: &str, reason: impl Into<String>) -> Self {
        SiteError::Fetch {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
