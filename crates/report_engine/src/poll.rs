use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use report_core::{Msg, SessionId};
use report_logging::report_trace;

/// The scheduled next tick of one poll session. Dropping the handle cancels
/// the tick; a cancelled tick never delivers `Msg::PollDue`.
#[derive(Debug)]
pub struct PollTimer {
    session: SessionId,
    token: CancellationToken,
}

impl PollTimer {
    /// Must be called from within a tokio runtime.
    pub fn schedule(session: SessionId, delay: Duration, tx: UnboundedSender<Msg>) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {
                    report_trace!("poll tick for session {} cancelled", session);
                }
                _ = tokio::time::sleep(delay) => {
                    let _ = tx.send(Msg::PollDue { session });
                }
            }
        });
        Self { session, token }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
