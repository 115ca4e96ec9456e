//! Report client core: pure task-lifecycle state machine and view-model helpers.
mod artifact;
mod effect;
mod error;
mod msg;
mod poller;
mod retry;
mod state;
mod task;
mod update;
mod view_model;

pub use artifact::{disposition_filename, Artifact, ContentKind, DEFAULT_FILENAME};
pub use effect::{Attempt, Effect};
pub use error::ControllerError;
pub use msg::{Msg, PresentOutcome, SubmitReply};
pub use poller::{PollSession, PollState, PollTransition};
pub use retry::{RetryPlan, RetryState};
pub use state::{
    ControllerConfig, ControllerState, Delivery, Phase, Severity, DEFAULT_POLL_INTERVAL,
};
pub use task::{FormData, ProgressSnapshot, SessionId, Task, TaskId, TaskStatus};
pub use update::update;
pub use view_model::ReportViewModel;
