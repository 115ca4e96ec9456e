use std::time::Duration;

use crate::view_model::ReportViewModel;
use crate::{Artifact, Attempt, PollSession, PollState, RetryState, SessionId, TaskId};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// How a completed task's report reaches the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    /// Download the artifact and present its content.
    #[default]
    Fetch,
    /// Hand the download URL to a new browsing context.
    OpenLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub poll_interval: Duration,
    pub delivery: Delivery,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            delivery: Delivery::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Retrieving,
    Presenting,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// A presentation that has been requested but not yet reported back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Presentation {
    pub(crate) attempt: Attempt,
    pub(crate) task_id: Option<TaskId>,
    pub(crate) artifact: Option<Artifact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerState {
    config: ControllerConfig,
    last_session: SessionId,
    session: Option<SessionId>,
    phase: Phase,
    poll: Option<PollSession>,
    poll_state: PollState,
    presentation: Option<Presentation>,
    retry: RetryState,
    status: String,
    severity: Severity,
    progress_percent: u8,
    progress_visible: bool,
    dirty: bool,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ControllerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn view(&self) -> ReportViewModel {
        ReportViewModel {
            phase: self.phase,
            poll_state: self.poll_state,
            task_id: self
                .poll
                .as_ref()
                .map(|poll| poll.task().id.to_string())
                .or_else(|| self.retry.last_task_id().map(ToString::to_string)),
            status: self.status.clone(),
            severity: self.severity,
            progress_percent: self.progress_percent,
            progress_visible: self.progress_visible,
            retry_visible: self.retry.is_armed(),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn retry(&self) -> &RetryState {
        &self.retry
    }

    pub fn poll(&self) -> Option<&PollSession> {
        self.poll.as_ref()
    }

    /// Id the next form submission will be given.
    pub fn next_session(&self) -> SessionId {
        self.last_session + 1
    }

    /// True while a network step or presentation is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            Phase::Submitting | Phase::Polling | Phase::Retrieving | Phase::Presenting
        )
    }

    pub(crate) fn is_current(&self, session: SessionId) -> bool {
        self.session == Some(session)
    }

    /// Allocates a new session and resets everything a previous run left
    /// behind. Returns the new id and the prior poll session, if any.
    pub(crate) fn begin_session(&mut self) -> (SessionId, Option<PollSession>) {
        self.last_session += 1;
        let session = self.last_session;
        self.session = Some(session);
        self.phase = Phase::Submitting;
        self.poll_state = PollState::Idle;
        self.presentation = None;
        self.retry.clear();
        self.progress_percent = 0;
        self.progress_visible = true;
        self.set_status("Generating report... Please wait.", Severity::Info);
        (session, self.poll.take())
    }

    pub(crate) fn start_poll(&mut self, poll: PollSession) {
        self.poll_state = poll.state();
        self.poll = Some(poll);
        self.phase = Phase::Polling;
        self.dirty = true;
    }

    /// The live poll session for `session`, if it is still polling.
    pub(crate) fn poll_mut(&mut self, session: SessionId) -> Option<&mut PollSession> {
        if !self.is_current(session) {
            return None;
        }
        self.poll
            .as_mut()
            .filter(|poll| poll.id() == session && poll.is_polling())
    }

    pub(crate) fn polled_task(&self, session: SessionId) -> Option<TaskId> {
        self.poll
            .as_ref()
            .filter(|poll| self.is_current(session) && poll.id() == session && poll.is_polling())
            .map(|poll| poll.task().id.clone())
    }

    pub(crate) fn show_progress(&mut self, percent: u8, message: &str) {
        self.progress_percent = percent;
        self.progress_visible = true;
        self.set_status(message, Severity::Info);
    }

    /// Drops the task once its poll session reached a terminal state.
    pub(crate) fn end_poll(&mut self) -> Option<PollSession> {
        let poll = self.poll.take();
        if let Some(poll) = &poll {
            self.poll_state = poll.state();
        }
        self.progress_visible = false;
        self.dirty = true;
        poll
    }

    pub(crate) fn begin_retrieval(&mut self, task_id: TaskId) {
        self.phase = Phase::Retrieving;
        self.presentation = Some(Presentation {
            attempt: Attempt::Initial,
            task_id: Some(task_id),
            artifact: None,
        });
    }

    pub(crate) fn is_retrieving(&self, session: SessionId) -> bool {
        self.is_current(session) && self.phase == Phase::Retrieving
    }

    pub(crate) fn begin_presentation(
        &mut self,
        attempt: Attempt,
        task_id: Option<TaskId>,
        artifact: Option<Artifact>,
    ) {
        self.phase = Phase::Presenting;
        self.presentation = Some(Presentation {
            attempt,
            task_id,
            artifact,
        });
        self.dirty = true;
    }

    pub(crate) fn retrieving_task(&self) -> Option<TaskId> {
        self.presentation
            .as_ref()
            .and_then(|presentation| presentation.task_id.clone())
    }

    /// Takes the outstanding presentation if the outcome belongs to it.
    pub(crate) fn take_presentation(
        &mut self,
        session: SessionId,
        attempt: Attempt,
    ) -> Option<Presentation> {
        if !self.is_current(session) || self.phase != Phase::Presenting {
            return None;
        }
        if self.presentation.as_ref()?.attempt != attempt {
            return None;
        }
        self.phase = Phase::Settled;
        self.presentation.take()
    }

    pub(crate) fn retry_mut(&mut self) -> &mut RetryState {
        &mut self.retry
    }

    pub(crate) fn settle(&mut self) {
        self.phase = Phase::Settled;
        self.presentation = None;
        self.progress_visible = false;
        self.dirty = true;
    }

    pub(crate) fn set_status(&mut self, text: impl Into<String>, severity: Severity) {
        self.status = text.into();
        self.severity = severity;
        self.dirty = true;
    }
}
