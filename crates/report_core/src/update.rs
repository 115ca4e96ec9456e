use report_logging::{report_debug, report_info, report_warn};

use crate::state::Presentation;
use crate::{
    Artifact, Attempt, ControllerError, ControllerState, Delivery, Effect, FormData, Msg, Phase,
    PollSession, PollTransition, PresentOutcome, ProgressSnapshot, RetryPlan, SessionId,
    Severity, SubmitReply, TaskId,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ControllerState, msg: Msg) -> (ControllerState, Vec<Effect>) {
    let effects = match msg {
        Msg::FormSubmitted(form) => submit(&mut state, form),
        Msg::SubmitResolved { session, outcome } => {
            if !state.is_current(session) || state.phase() != Phase::Submitting {
                report_debug!("dropping stale submit reply for session {}", session);
                return (state, Vec::new());
            }
            match outcome {
                Ok(SubmitReply::Accepted(task_id)) => start_polling(&mut state, session, task_id),
                Ok(SubmitReply::Delivered(artifact)) => {
                    report_info!("generate returned a {:?} report directly", artifact.kind());
                    state.end_poll();
                    present(&mut state, session, Attempt::Initial, None, artifact)
                }
                Err(err) => {
                    fail(&mut state, err);
                    Vec::new()
                }
            }
        }
        Msg::PollDue { session } => match state.polled_task(session) {
            Some(task_id) => vec![Effect::FetchProgress { session, task_id }],
            None => {
                report_debug!("ignoring poll tick for inactive session {}", session);
                Vec::new()
            }
        },
        Msg::ProgressReceived { session, outcome } => match outcome {
            Ok(snapshot) => ingest_progress(&mut state, session, snapshot),
            Err(err) => polling_errored(&mut state, session, err),
        },
        Msg::ArtifactFetched { session, outcome } => {
            if !state.is_retrieving(session) {
                report_debug!("dropping stale artifact for session {}", session);
                return (state, Vec::new());
            }
            match outcome {
                Ok(artifact) => {
                    let task_id = state.retrieving_task();
                    present(&mut state, session, Attempt::Initial, task_id, artifact)
                }
                Err(err) => {
                    fail(&mut state, err);
                    Vec::new()
                }
            }
        }
        Msg::Presented {
            session,
            attempt,
            outcome,
        } => {
            match state.take_presentation(session, attempt) {
                Some(presentation) => presented(&mut state, presentation, outcome),
                None => report_debug!("dropping stale presentation outcome {:?}", outcome),
            }
            Vec::new()
        }
        Msg::RetryClicked => retry(&mut state),
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit(state: &mut ControllerState, form: FormData) -> Vec<Effect> {
    let (session, previous) = state.begin_session();
    let mut effects = Vec::with_capacity(2);
    if let Some(previous) = previous.filter(PollSession::is_polling) {
        report_info!(
            "new submission replaces task {} of session {}",
            previous.task().id,
            previous.id()
        );
        effects.push(Effect::CancelPoll {
            session: previous.id(),
        });
    }
    report_info!("submitting report form with {} fields", form.len());
    effects.push(Effect::Submit { session, form });
    effects
}

fn start_polling(state: &mut ControllerState, session: SessionId, task_id: TaskId) -> Vec<Effect> {
    report_info!("task {} accepted; polling", task_id);
    state.start_poll(PollSession::start(session, task_id));
    vec![Effect::SchedulePoll {
        session,
        delay: state.config().poll_interval,
    }]
}

fn ingest_progress(
    state: &mut ControllerState,
    session: SessionId,
    snapshot: ProgressSnapshot,
) -> Vec<Effect> {
    let Some(poll) = state.poll_mut(session) else {
        report_debug!("dropping stale progress {} for session {}", snapshot.progress, session);
        return Vec::new();
    };
    let transition = poll.ingest(&snapshot);
    let percent = poll.task().percent();
    let task_id = poll.task().id.clone();
    report_debug!("task {} progress {} '{}'", task_id, snapshot.progress, snapshot.message);

    match transition {
        PollTransition::Continue => {
            state.show_progress(percent, &snapshot.message);
            vec![Effect::SchedulePoll {
                session,
                delay: state.config().poll_interval,
            }]
        }
        PollTransition::Completed => {
            report_info!("task {} completed", task_id);
            state.end_poll();
            state.set_status("Done! Opening report...", Severity::Info);
            let mut effects = vec![Effect::CancelPoll { session }];
            match state.config().delivery {
                Delivery::Fetch => {
                    state.begin_retrieval(task_id.clone());
                    effects.push(Effect::FetchArtifact { session, task_id });
                }
                Delivery::OpenLocation => {
                    state.begin_presentation(Attempt::Initial, Some(task_id.clone()), None);
                    effects.push(Effect::OpenLocation {
                        session,
                        attempt: Attempt::Initial,
                        task_id,
                    });
                }
            }
            effects
        }
        PollTransition::Failed => {
            report_warn!("task {} failed on the server: {}", task_id, snapshot.message);
            state.end_poll();
            fail(
                state,
                ControllerError::JobFailed {
                    message: snapshot.message,
                },
            );
            vec![Effect::CancelPoll { session }]
        }
        PollTransition::Ignored => Vec::new(),
    }
}

fn polling_errored(
    state: &mut ControllerState,
    session: SessionId,
    err: ControllerError,
) -> Vec<Effect> {
    let Some(poll) = state.poll_mut(session) else {
        report_debug!("dropping stale poll failure for session {}: {}", session, err);
        return Vec::new();
    };
    poll.error();
    state.end_poll();
    let err = match err {
        ControllerError::PollingErrored(_) => err,
        other => ControllerError::PollingErrored(other.to_string()),
    };
    fail(state, err);
    vec![Effect::CancelPoll { session }]
}

fn present(
    state: &mut ControllerState,
    session: SessionId,
    attempt: Attempt,
    task_id: Option<TaskId>,
    artifact: Artifact,
) -> Vec<Effect> {
    state.begin_presentation(attempt, task_id, Some(artifact.clone()));
    vec![Effect::Present {
        session,
        attempt,
        artifact,
    }]
}

fn presented(state: &mut ControllerState, presentation: Presentation, outcome: PresentOutcome) {
    match (outcome, presentation.attempt) {
        (PresentOutcome::Opened, _) => {
            state.retry_mut().clear();
            let text = match &presentation.artifact {
                Some(Artifact::Pdf { .. }) => "PDF report opened.".to_string(),
                Some(Artifact::Html { .. }) => "HTML report opened.".to_string(),
                Some(Artifact::Other { filename, .. }) => {
                    format!("Report downloaded as {filename}.")
                }
                None => "Report opened.".to_string(),
            };
            state.settle();
            state.set_status(text, Severity::Success);
        }
        (PresentOutcome::Blocked, Attempt::Initial) => {
            report_warn!("presentation blocked; keeping report for retry");
            state
                .retry_mut()
                .retain(presentation.task_id, presentation.artifact);
            fail(state, ControllerError::PopupBlocked);
        }
        (PresentOutcome::Blocked, Attempt::Retry) => {
            report_warn!("retry blocked again");
            fail(state, ControllerError::PopupBlockedAgain);
        }
    }
}

fn retry(state: &mut ControllerState) -> Vec<Effect> {
    if state.is_busy() {
        report_debug!("retry ignored while {:?}", state.phase());
        return Vec::new();
    }
    let (Some(session), Some(plan)) = (state.session(), state.retry().plan()) else {
        state.set_status("No previous task to retry.", Severity::Warning);
        return Vec::new();
    };
    let task_id = state.retry().last_task_id().cloned();
    match plan {
        RetryPlan::Present(artifact) => {
            report_info!("retrying presentation from cached report");
            present(state, session, Attempt::Retry, task_id, artifact)
        }
        RetryPlan::Reopen(task_id) => {
            report_info!("retrying download location for task {}", task_id);
            state.begin_presentation(Attempt::Retry, Some(task_id.clone()), None);
            vec![Effect::OpenLocation {
                session,
                attempt: Attempt::Retry,
                task_id,
            }]
        }
    }
}

fn fail(state: &mut ControllerState, err: ControllerError) {
    let severity = if err.is_recoverable() {
        Severity::Warning
    } else {
        Severity::Error
    };
    state.settle();
    state.set_status(err.to_string(), severity);
}
