use thiserror::Error;

/// Every failure the controller can surface. `Display` is the status line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("Error: {0}")]
    SubmissionFailed(String),
    #[error("Something went wrong. Check the logs.")]
    JobFailed { message: String },
    #[error("Error checking progress.")]
    PollingErrored(String),
    #[error("Error retrieving report: {0}")]
    RetrievalFailed(String),
    #[error("Pop-up blocked. Please allow pop-ups and click Retry.")]
    PopupBlocked,
    #[error("Pop-up blocked again. Please allow pop-ups to view the report.")]
    PopupBlockedAgain,
    #[error("Unexpected report format: {0}")]
    UnexpectedFormat(String),
}

impl ControllerError {
    /// Blocked presentations keep the artifact and can be retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ControllerError::PopupBlocked | ControllerError::PopupBlockedAgain
        )
    }
}
