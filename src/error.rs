use crate::wizard::ValidationErrors;
use thiserror::Error;

/// Failure reported by a remote collaborator
///
/// Anything surfacing here already went through the transport's single
/// refresh-and-retry, so callers treat it as terminal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("session expired, sign in again")]
    Unauthorized,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

/// One attachment that could not be stored
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to upload {file_name}: {reason}")]
pub struct AttachmentUploadError {
    pub file_name: String,
    pub reason: String,
}

/// Rejected wizard interaction; the snapshot is left untouched
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("model {0} is not in the catalog")]
    UnknownModel(i64),
    #[error("color {0} is not offered for the selected model")]
    ColorNotInPalette(i64),
    #[error("select a model first")]
    NoModelSelected,
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Why a submission attempt ended without creating the record
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("form has {} invalid field(s)", .0.len())]
    Validation(ValidationErrors),
    #[error("none of the {requested} attachment(s) could be uploaded")]
    Aborted {
        requested: usize,
        failures: Vec<AttachmentUploadError>,
    },
    #[error("product creation rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("product creation failed: {0}")]
    Transport(String),
    #[error("wizard session was abandoned before the submission finished")]
    Abandoned,
}

impl From<ServiceError> for SubmissionError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Rejected { status, message } => {
                SubmissionError::Rejected { status, message }
            }
            ServiceError::Unauthorized => SubmissionError::Rejected {
                status: 401,
                message: "session expired".to_string(),
            },
            other => SubmissionError::Transport(other.to_string()),
        }
    }
}
