use std::fmt;

use report_core::ControllerError;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn is_format_problem(&self) -> bool {
        matches!(
            self.kind,
            FailureKind::MissingContentType | FailureKind::Decode
        )
    }

    /// Failure of `/generate`, including a malformed direct artifact.
    pub fn into_submission_error(self) -> ControllerError {
        if self.is_format_problem() {
            ControllerError::UnexpectedFormat(self.message)
        } else {
            ControllerError::SubmissionFailed(self.message)
        }
    }

    pub fn into_polling_error(self) -> ControllerError {
        ControllerError::PollingErrored(self.to_string())
    }

    pub fn into_retrieval_error(self) -> ControllerError {
        if self.is_format_problem() {
            ControllerError::UnexpectedFormat(self.message)
        } else {
            ControllerError::RetrievalFailed(self.message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// Non-2xx status without a structured error body.
    HttpStatus(u16),
    /// The server answered with `{error: ...}`.
    Rejected { status: u16 },
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    InvalidJson,
    UnexpectedResponse,
    MissingContentType,
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Rejected { status } => write!(f, "rejected with status {status}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::InvalidJson => write!(f, "invalid json"),
            FailureKind::UnexpectedResponse => write!(f, "unexpected response"),
            FailureKind::MissingContentType => write!(f, "missing content type"),
            FailureKind::Decode => write!(f, "decode error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// `GET /service/healthz` reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateReply {
    #[serde(default)]
    pub(crate) task_id: Option<String>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressReply {
    pub(crate) progress: f64,
    #[serde(default)]
    pub(crate) message: Option<String>,
}
