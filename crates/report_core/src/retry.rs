use crate::{Artifact, TaskId};

/// What is kept after a blocked presentation so it can be retried without
/// resubmitting the job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RetryState {
    last_task_id: Option<TaskId>,
    last_artifact: Option<Artifact>,
}

/// How a retry re-presents the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryPlan {
    /// Present the cached artifact again.
    Present(Artifact),
    /// Re-derive the download location from the task id.
    Reopen(TaskId),
}

impl RetryState {
    pub fn retain(&mut self, task_id: Option<TaskId>, artifact: Option<Artifact>) {
        self.last_task_id = task_id;
        self.last_artifact = artifact;
    }

    pub fn clear(&mut self) {
        self.last_task_id = None;
        self.last_artifact = None;
    }

    /// True while something is retained, i.e. the Retry action is offered.
    pub fn is_armed(&self) -> bool {
        self.last_task_id.is_some() || self.last_artifact.is_some()
    }

    pub fn last_task_id(&self) -> Option<&TaskId> {
        self.last_task_id.as_ref()
    }

    pub fn last_artifact(&self) -> Option<&Artifact> {
        self.last_artifact.as_ref()
    }

    /// Cached data wins over the task id.
    pub fn plan(&self) -> Option<RetryPlan> {
        if let Some(artifact) = &self.last_artifact {
            return Some(RetryPlan::Present(artifact.clone()));
        }
        self.last_task_id.clone().map(RetryPlan::Reopen)
    }
}
