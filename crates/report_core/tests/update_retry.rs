use std::sync::Once;

use pretty_assertions::assert_eq;
use report_core::{
    update, Artifact, Attempt, ControllerConfig, ControllerState, Delivery, Effect, FormData, Msg,
    Phase, PresentOutcome, ProgressSnapshot, Severity, SubmitReply, TaskId,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(report_logging::initialize_for_tests);
}

fn html() -> Artifact {
    Artifact::Html {
        document: "<h1>Report</h1>".into(),
    }
}

fn blocked(attempt: Attempt) -> Msg {
    Msg::Presented {
        session: 1,
        attempt,
        outcome: PresentOutcome::Blocked,
    }
}

fn opened(attempt: Attempt) -> Msg {
    Msg::Presented {
        session: 1,
        attempt,
        outcome: PresentOutcome::Opened,
    }
}

/// Synchronous protocol: `/generate` returns HTML, first open is blocked.
fn blocked_direct_html() -> ControllerState {
    let (state, _) = update(ControllerState::new(), Msg::FormSubmitted(FormData::new()));
    let (state, _) = update(
        state,
        Msg::SubmitResolved {
            session: 1,
            outcome: Ok(SubmitReply::Delivered(html())),
        },
    );
    let (state, _) = update(state, blocked(Attempt::Initial));
    state
}

#[test]
fn retry_presents_cached_html_without_resubmitting() {
    init_logging();
    let state = blocked_direct_html();
    assert!(state.view().retry_visible);
    assert_eq!(state.retry().last_artifact(), Some(&html()));

    let (state, effects) = update(state, Msg::RetryClicked);
    assert_eq!(
        effects,
        vec![Effect::Present {
            session: 1,
            attempt: Attempt::Retry,
            artifact: html(),
        }]
    );
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::Submit { .. })));

    let (state, _) = update(state, opened(Attempt::Retry));
    let view = state.view();
    assert_eq!(view.status, "HTML report opened.");
    assert!(!view.retry_visible);
    assert_eq!(state.retry().last_artifact(), None);
}

#[test]
fn retry_blocked_again_keeps_affordance() {
    init_logging();
    let state = blocked_direct_html();
    let (state, _) = update(state, Msg::RetryClicked);
    let (state, effects) = update(state, blocked(Attempt::Retry));

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(
        view.status,
        "Pop-up blocked again. Please allow pop-ups to view the report."
    );
    assert!(view.retry_visible);
    assert_eq!(view.phase, Phase::Settled);

    // The user changes settings and tries once more.
    let (state, effects) = update(state, Msg::RetryClicked);
    assert_eq!(effects.len(), 1);
    let (state, _) = update(state, opened(Attempt::Retry));
    assert!(!state.view().retry_visible);
}

#[test]
fn retry_without_retained_state_reports_it() {
    init_logging();
    let (state, effects) = update(ControllerState::new(), Msg::RetryClicked);
    assert!(effects.is_empty());
    assert_eq!(state.view().status, "No previous task to retry.");
    assert_eq!(state.view().severity, Severity::Warning);
}

#[test]
fn retry_is_ignored_while_a_presentation_is_outstanding() {
    init_logging();
    let state = blocked_direct_html();
    let (state, _) = update(state, Msg::RetryClicked);
    let (_, effects) = update(state, Msg::RetryClicked);
    assert!(effects.is_empty());
}

#[test]
fn location_retry_reopens_download_for_retained_task() {
    init_logging();
    let state = ControllerState::with_config(ControllerConfig {
        delivery: Delivery::OpenLocation,
        ..ControllerConfig::default()
    });
    let (state, _) = update(state, Msg::FormSubmitted(FormData::new()));
    let (state, _) = update(
        state,
        Msg::SubmitResolved {
            session: 1,
            outcome: Ok(SubmitReply::Accepted(TaskId::new("t7"))),
        },
    );
    let (state, _) = update(
        state,
        Msg::ProgressReceived {
            session: 1,
            outcome: Ok(ProgressSnapshot::new(100, "done")),
        },
    );
    let (state, _) = update(state, blocked(Attempt::Initial));
    assert_eq!(state.retry().last_task_id(), Some(&TaskId::new("t7")));
    assert_eq!(state.retry().last_artifact(), None);

    let (state, effects) = update(state, Msg::RetryClicked);
    assert_eq!(
        effects,
        vec![Effect::OpenLocation {
            session: 1,
            attempt: Attempt::Retry,
            task_id: TaskId::new("t7"),
        }]
    );
    let (state, _) = update(state, opened(Attempt::Retry));
    assert_eq!(state.view().status, "Report opened.");
}

#[test]
fn new_submission_clears_retained_state() {
    init_logging();
    let state = blocked_direct_html();
    let (state, effects) = update(state, Msg::FormSubmitted(FormData::new()));

    assert_eq!(
        effects,
        vec![Effect::Submit {
            session: 2,
            form: FormData::new(),
        }]
    );
    assert!(!state.view().retry_visible);
    assert_eq!(state.retry().last_artifact(), None);
    assert_eq!(state.retry().last_task_id(), None);
}
