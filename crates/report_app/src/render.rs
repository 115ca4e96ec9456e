use report_core::{ReportViewModel, Severity};

const BAR_WIDTH: usize = 30;

/// Terminal lines for one view: progress bar while visible, then the status.
pub fn render(view: &ReportViewModel) -> Vec<String> {
    let mut lines = Vec::with_capacity(2);
    if view.progress_visible {
        lines.push(progress_line(view.progress_percent, view.task_id.as_deref()));
    }
    if !view.status.is_empty() {
        lines.push(format!("{} {}", severity_label(view.severity), view.status));
    }
    lines
}

fn progress_line(percent: u8, task_id: Option<&str>) -> String {
    let percent = percent.min(100);
    let filled = usize::from(percent) * BAR_WIDTH / 100;
    let bar = format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent
    );
    match task_id {
        Some(task_id) => format!("{bar} task {task_id}"),
        None => bar,
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "[info]",
        Severity::Success => "[ok]",
        Severity::Warning => "[warn]",
        Severity::Error => "[error]",
    }
}
