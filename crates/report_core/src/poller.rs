use crate::{ProgressSnapshot, SessionId, Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollState {
    #[default]
    Idle,
    Polling,
    Completed,
    Failed,
    Errored,
}

impl PollState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PollState::Completed | PollState::Failed | PollState::Errored
        )
    }
}

/// What ingesting one snapshot did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTransition {
    Continue,
    Completed,
    Failed,
    /// The session was not polling; the snapshot was dropped.
    Ignored,
}

/// Ties a task to the poll loop of one submission. The timer itself lives in
/// the engine and is addressed by `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSession {
    id: SessionId,
    task: Task,
    state: PollState,
}

impl PollSession {
    /// Enters `Polling` for a freshly accepted task.
    pub fn start(id: SessionId, task_id: TaskId) -> Self {
        Self {
            id,
            task: Task::new(task_id),
            state: PollState::Polling,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn is_polling(&self) -> bool {
        self.state == PollState::Polling
    }

    pub fn ingest(&mut self, snapshot: &ProgressSnapshot) -> PollTransition {
        if !self.is_polling() {
            return PollTransition::Ignored;
        }
        self.task.apply(snapshot);
        if snapshot.progress >= 100 {
            self.state = PollState::Completed;
            PollTransition::Completed
        } else if snapshot.progress < 0 {
            self.state = PollState::Failed;
            PollTransition::Failed
        } else {
            PollTransition::Continue
        }
    }

    /// A status request failed in transport or parsing. Returns false when
    /// the session had already left `Polling`.
    pub fn error(&mut self) -> bool {
        if !self.is_polling() {
            return false;
        }
        self.state = PollState::Errored;
        true
    }
}
