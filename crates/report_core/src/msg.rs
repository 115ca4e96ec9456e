use crate::{Artifact, Attempt, ControllerError, FormData, ProgressSnapshot, SessionId, TaskId};

/// Successful `/generate` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitReply {
    /// Asynchronous protocol: poll this task.
    Accepted(TaskId),
    /// Synchronous protocol: the report itself.
    Delivered(Artifact),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    /// A new browsing context (or download) was obtained.
    Opened,
    /// The context could not be opened; nothing was shown.
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted the report form.
    FormSubmitted(FormData),
    /// `/generate` finished.
    SubmitResolved {
        session: SessionId,
        outcome: Result<SubmitReply, ControllerError>,
    },
    /// The poll timer for a session fired.
    PollDue { session: SessionId },
    /// `/progress/{id}` finished.
    ProgressReceived {
        session: SessionId,
        outcome: Result<ProgressSnapshot, ControllerError>,
    },
    /// `/download/{id}` finished.
    ArtifactFetched {
        session: SessionId,
        outcome: Result<Artifact, ControllerError>,
    },
    /// A presentation attempt finished.
    Presented {
        session: SessionId,
        attempt: Attempt,
        outcome: PresentOutcome,
    },
    /// User clicked Retry.
    RetryClicked,
    /// Fallback for placeholder wiring.
    NoOp,
}

impl Msg {
    /// Session a network or timer result belongs to. User actions carry none.
    pub fn session(&self) -> Option<SessionId> {
        match self {
            Msg::SubmitResolved { session, .. }
            | Msg::PollDue { session }
            | Msg::ProgressReceived { session, .. }
            | Msg::ArtifactFetched { session, .. }
            | Msg::Presented { session, .. } => Some(*session),
            Msg::FormSubmitted(_) | Msg::RetryClicked | Msg::NoOp => None,
        }
    }
}
