use std::time::Duration;

use crate::{Artifact, FormData, SessionId, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Initial,
    Retry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Submit { session: SessionId, form: FormData },
    SchedulePoll { session: SessionId, delay: Duration },
    CancelPoll { session: SessionId },
    FetchProgress { session: SessionId, task_id: TaskId },
    FetchArtifact { session: SessionId, task_id: TaskId },
    OpenLocation {
        session: SessionId,
        attempt: Attempt,
        task_id: TaskId,
    },
    Present {
        session: SessionId,
        attempt: Attempt,
        artifact: Artifact,
    },
}
