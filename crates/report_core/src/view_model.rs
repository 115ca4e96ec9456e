use crate::{Phase, PollState, Severity};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportViewModel {
    pub phase: Phase,
    pub poll_state: PollState,
    pub task_id: Option<String>,
    pub status: String,
    pub severity: Severity,
    pub progress_percent: u8,
    pub progress_visible: bool,
    pub retry_visible: bool,
    pub dirty: bool,
}
