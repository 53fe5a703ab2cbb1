//! Error types for the content studio

use thiserror::Error;

/// Result type alias for studio operations
pub type StudioResult<T> = Result<T, StudioError>;

/// Errors surfaced by the studio.
///
/// Per-item generation failures never show up here: the orchestrator folds them
/// into `None` slots. What does propagate is batch-level, precondition and
/// credential failure, plus whatever a single-item operation (edit, post text)
/// runs into.
#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("No API key configured; paste a key to continue")]
    MissingCredential,

    #[error("The API key was rejected: {0}")]
    InvalidCredential(String),

    #[error("API quota exceeded, try again later: {0}")]
    QuotaExceeded(String),

    #[error("No artifacts were produced for {attempted} prompt(s); revise the descriptions and try again")]
    BatchFailed { attempted: usize },

    /// A newer batch started on the same lane before this one settled.
    #[error("Batch {batch_id} was superseded by a newer request")]
    Superseded { batch_id: uuid::Uuid },

    #[error("The service returned no artifact")]
    NoArtifact,

    #[error("Generation service error: {0}")]
    Collaborator(String),

    #[error("Video operation still running after {polls} polls")]
    OperationTimeout { polls: u32 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StudioError {
    /// True for the one category that invalidates the session credential.
    pub fn is_credential_failure(&self) -> bool {
        matches!(self, StudioError::InvalidCredential(_))
    }

    /// Classify a vendor error message into the studio taxonomy.
    pub fn from_vendor_message(status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("api key not valid")
            || lower.contains("api_key_invalid")
            || matches!(status, Some(401))
        {
            StudioError::InvalidCredential(message)
        } else if lower.contains("quota") || matches!(status, Some(429)) {
            StudioError::QuotaExceeded(message)
        } else {
            StudioError::Collaborator(message)
        }
    }
}

impl From<zip::result::ZipError> for StudioError {
    fn from(err: zip::result::ZipError) -> Self {
        StudioError::Export(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_key_message_is_credential_failure() {
        let err = StudioError::from_vendor_message(
            Some(400),
            "API key not valid. Please pass a valid API key.",
        );
        assert!(err.is_credential_failure());
    }

    #[test]
    fn quota_is_not_credential_failure() {
        let err = StudioError::from_vendor_message(Some(429), "Resource has been exhausted");
        assert!(matches!(err, StudioError::QuotaExceeded(_)));
        assert!(!err.is_credential_failure());

        let err = StudioError::from_vendor_message(None, "You exceeded your current quota");
        assert!(matches!(err, StudioError::QuotaExceeded(_)));
    }

    #[test]
    fn other_messages_are_collaborator_errors() {
        let err = StudioError::from_vendor_message(Some(500), "internal");
        assert!(matches!(err, StudioError::Collaborator(_)));
    }

    #[test]
    fn batch_failed_message_mentions_revision() {
        let msg = StudioError::BatchFailed { attempted: 2 }.to_string();
        assert!(msg.contains("2 prompt(s)"));
        assert!(msg.contains("revise"));
    }
}
