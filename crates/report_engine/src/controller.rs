use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use report_core::{
    update, ControllerConfig, ControllerState, Effect, FormData, Msg, ReportViewModel,
};
use report_logging::{report_debug, report_trace};

use crate::poll::PollTimer;
use crate::present::{present_artifact, present_location, Presenter};
use crate::ReportClient;

/// Single-threaded event loop around the pure core: applies messages,
/// executes the resulting effects and feeds their results back in.
///
/// Network effects run as spawned tasks, so every method must be called
/// from within a tokio runtime.
pub struct Controller<P: Presenter> {
    state: ControllerState,
    client: Arc<dyn ReportClient>,
    presenter: P,
    tx: UnboundedSender<Msg>,
    rx: UnboundedReceiver<Msg>,
    poll: Option<PollTimer>,
}

impl<P: Presenter> Controller<P> {
    pub fn new(client: Arc<dyn ReportClient>, presenter: P, config: ControllerConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: ControllerState::with_config(config),
            client,
            presenter,
            tx,
            rx,
            poll: None,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn view(&self) -> ReportViewModel {
        self.state.view()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// True while a poll tick is scheduled and has neither fired nor been
    /// cancelled. False while a progress request is in flight.
    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().is_some_and(|timer| !timer.is_cancelled())
    }

    pub fn submit(&mut self, form: FormData) -> Option<ReportViewModel> {
        self.dispatch(Msg::FormSubmitted(form))
    }

    pub fn retry(&mut self) -> Option<ReportViewModel> {
        self.dispatch(Msg::RetryClicked)
    }

    /// Applies one message. Returns the new view when it changed.
    pub fn dispatch(&mut self, msg: Msg) -> Option<ReportViewModel> {
        let session = match &msg {
            Msg::FormSubmitted(_) => Some(self.state.next_session()),
            other => other.session().or(self.state.session()),
        };
        if let Some(session) = session {
            report_logging::set_session(session);
        }
        if let Msg::PollDue { session } = &msg {
            // A fired timer has nothing left to cancel.
            if self.poll.as_ref().is_some_and(|timer| timer.session() == *session) {
                self.poll = None;
            }
        }

        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        for effect in effects {
            self.run_effect(effect);
        }

        let view = self.state.view();
        self.state.consume_dirty().then_some(view)
    }

    /// Waits for the next result of an outstanding effect and applies it.
    pub async fn next(&mut self) -> Option<ReportViewModel> {
        let msg = self.rx.recv().await?;
        self.dispatch(msg)
    }

    /// Processes results until nothing is outstanding, calling `on_view`
    /// for every changed view. Returns the settled view.
    pub async fn settle_with(
        &mut self,
        mut on_view: impl FnMut(&ReportViewModel),
    ) -> ReportViewModel {
        while self.state.is_busy() {
            let Some(msg) = self.rx.recv().await else {
                break;
            };
            if let Some(view) = self.dispatch(msg) {
                on_view(&view);
            }
        }
        self.state.view()
    }

    pub async fn settle(&mut self) -> ReportViewModel {
        self.settle_with(|_| {}).await
    }

    fn run_effect(&mut self, effect: Effect) {
        report_trace!("effect {}", effect_name(&effect));
        match effect {
            Effect::Submit { session, form } => {
                let client = Arc::clone(&self.client);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let outcome = client
                        .submit(&form)
                        .await
                        .map_err(|err| err.into_submission_error());
                    let _ = tx.send(Msg::SubmitResolved { session, outcome });
                });
            }
            Effect::SchedulePoll { session, delay } => {
                // Replacing the handle cancels any tick still pending.
                self.poll = Some(PollTimer::schedule(session, delay, self.tx.clone()));
            }
            Effect::CancelPoll { session } => {
                if self.poll.as_ref().is_some_and(|timer| timer.session() == session) {
                    report_debug!("cancelling poll timer of session {}", session);
                    self.poll = None;
                }
            }
            Effect::FetchProgress { session, task_id } => {
                let client = Arc::clone(&self.client);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let outcome = client
                        .progress(&task_id)
                        .await
                        .map_err(|err| err.into_polling_error());
                    let _ = tx.send(Msg::ProgressReceived { session, outcome });
                });
            }
            Effect::FetchArtifact { session, task_id } => {
                let client = Arc::clone(&self.client);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let outcome = client
                        .download(&task_id)
                        .await
                        .map_err(|err| err.into_retrieval_error());
                    let _ = tx.send(Msg::ArtifactFetched { session, outcome });
                });
            }
            Effect::OpenLocation {
                session,
                attempt,
                task_id,
            } => {
                let url = self.client.download_url(&task_id);
                let outcome = present_location(&mut self.presenter, &url);
                let _ = self.tx.send(Msg::Presented {
                    session,
                    attempt,
                    outcome,
                });
            }
            Effect::Present {
                session,
                attempt,
                artifact,
            } => {
                let outcome = present_artifact(&mut self.presenter, &artifact);
                let _ = self.tx.send(Msg::Presented {
                    session,
                    attempt,
                    outcome,
                });
            }
        }
    }
}

fn effect_name(effect: &Effect) -> &'static str {
    match effect {
        Effect::Submit { .. } => "submit",
        Effect::SchedulePoll { .. } => "schedule-poll",
        Effect::CancelPoll { .. } => "cancel-poll",
        Effect::FetchProgress { .. } => "fetch-progress",
        Effect::FetchArtifact { .. } => "fetch-artifact",
        Effect::OpenLocation { .. } => "open-location",
        Effect::Present { .. } => "present",
    }
}
