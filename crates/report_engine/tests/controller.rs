use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use report_core::{ControllerConfig, Delivery, FormData, Phase, ReportViewModel, Severity};
use report_engine::{
    ClientSettings, ContextHandle, Controller, Presenter, ReportClient, ReqwestReportClient,
};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct RecordingPresenter {
    blocked: bool,
    opened: Vec<String>,
    blocked_attempts: usize,
}

impl RecordingPresenter {
    fn blocked() -> Self {
        Self {
            blocked: true,
            ..Self::default()
        }
    }

    fn record(&mut self, what: String) -> Option<ContextHandle> {
        if self.blocked {
            self.blocked_attempts += 1;
            return None;
        }
        self.opened.push(what.clone());
        Some(ContextHandle::new(what))
    }
}

impl Presenter for RecordingPresenter {
    fn open_pdf(&mut self, bytes: &[u8]) -> Option<ContextHandle> {
        self.record(format!("pdf:{}", bytes.len()))
    }

    fn write_html(&mut self, document: &str) -> Option<ContextHandle> {
        self.record(format!("html:{document}"))
    }

    fn download(&mut self, filename: &str, bytes: &[u8]) -> Option<ContextHandle> {
        self.record(format!("file:{filename}:{}", bytes.len()))
    }

    fn open_location(&mut self, url: &str) -> Option<ContextHandle> {
        self.record(format!("url:{url}"))
    }
}

fn client_for(server: &MockServer) -> Arc<dyn ReportClient> {
    Arc::new(
        ReqwestReportClient::new(ClientSettings {
            base_url: server.uri(),
            ..ClientSettings::default()
        })
        .expect("client"),
    )
}

fn fast_config(delivery: Delivery) -> ControllerConfig {
    ControllerConfig {
        poll_interval: Duration::from_millis(10),
        delivery,
    }
}

fn form() -> FormData {
    FormData::new()
        .with_field("participant_id", "U123")
        .with_field("start_date", "2024-01-01")
        .with_field("output_format", "pdf")
        .with_field("report_id", "bidmc/social_media_dn_report.py")
}

async fn settle(
    controller: &mut Controller<RecordingPresenter>,
    seen: &mut Vec<String>,
) -> ReportViewModel {
    tokio::time::timeout(
        SETTLE_TIMEOUT,
        controller.settle_with(|view| seen.push(view.status.clone())),
    )
    .await
    .expect("controller settles")
}

async fn mount_generate(server: &MockServer, task_id: &str) {
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "task_id": task_id })))
        .expect(1)
        .mount(server)
        .await;
}

async fn progress_requests(server: &MockServer, task_id: &str) -> usize {
    let target = format!("/progress/{task_id}");
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == target)
        .count()
}

#[tokio::test]
async fn pdf_report_is_fetched_and_opened_after_polling() {
    let server = MockServer::start().await;
    mount_generate(&server, "t1").await;
    Mock::given(method("GET"))
        .and(path("/progress/t1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "progress": 50, "message": "working" })),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/progress/t1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "progress": 100, "message": "done" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/t1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"%PDF-1.7".to_vec(), "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = Controller::new(
        client_for(&server),
        RecordingPresenter::default(),
        fast_config(Delivery::Fetch),
    );
    let first = controller.submit(form()).expect("submission changes the view");
    assert_eq!(first.status, "Generating report... Please wait.");
    assert!(first.progress_visible);

    let mut seen = Vec::new();
    let view = settle(&mut controller, &mut seen).await;

    assert!(seen.contains(&"working".to_string()));
    assert_eq!(view.status, "PDF report opened.");
    assert_eq!(view.severity, Severity::Success);
    assert_eq!(view.phase, Phase::Settled);
    assert!(!view.retry_visible);
    assert!(!view.progress_visible);
    assert_eq!(controller.presenter().opened, vec!["pdf:8".to_string()]);
    assert!(!controller.is_polling());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(progress_requests(&server, "t1").await, 2);
}

#[tokio::test]
async fn failed_job_stops_polling_without_download() {
    let server = MockServer::start().await;
    mount_generate(&server, "t2").await;
    Mock::given(method("GET"))
        .and(path("/progress/t2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "progress": -1, "message": "boom" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/download/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("x", "text/plain"))
        .expect(0)
        .mount(&server)
        .await;

    let mut controller = Controller::new(
        client_for(&server),
        RecordingPresenter::default(),
        fast_config(Delivery::Fetch),
    );
    controller.submit(form());
    let view = settle(&mut controller, &mut Vec::new()).await;

    assert_eq!(view.status, "Something went wrong. Check the logs.");
    assert_eq!(view.severity, Severity::Error);
    assert!(!view.retry_visible);
    assert!(controller.presenter().opened.is_empty());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(progress_requests(&server, "t2").await, 1);
}

#[tokio::test]
async fn missing_report_after_completion_is_an_error_without_retry() {
    let server = MockServer::start().await;
    mount_generate(&server, "t4").await;
    Mock::given(method("GET"))
        .and(path("/progress/t4"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "progress": 100, "message": "done" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/t4"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Report not found"))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = Controller::new(
        client_for(&server),
        RecordingPresenter::default(),
        fast_config(Delivery::Fetch),
    );
    controller.submit(form());
    let mut seen = Vec::new();
    let view = settle(&mut controller, &mut seen).await;

    assert!(seen.contains(&"Done! Opening report...".to_string()));
    assert_eq!(view.status, "Error retrieving report: Report not found");
    assert_eq!(view.severity, Severity::Error);
    assert_eq!(view.phase, Phase::Settled);
    assert!(!view.retry_visible);
    assert!(controller.presenter().opened.is_empty());
    assert_eq!(controller.presenter().blocked_attempts, 0);

    let view = controller.retry().expect("status changes");
    assert_eq!(view.status, "No previous task to retry.");
}

#[tokio::test]
async fn fired_tick_is_released_while_progress_is_in_flight() {
    let server = MockServer::start().await;
    mount_generate(&server, "t5").await;
    Mock::given(method("GET"))
        .and(path("/progress/t5"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "progress": 100, "message": "done" }))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/t5"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF".to_vec(), "application/pdf"))
        .mount(&server)
        .await;

    let mut controller = Controller::new(
        client_for(&server),
        RecordingPresenter::default(),
        fast_config(Delivery::Fetch),
    );
    controller.submit(form());

    // Accepted: the first tick is scheduled.
    tokio::time::timeout(SETTLE_TIMEOUT, controller.next())
        .await
        .expect("submit resolves");
    assert_eq!(controller.state().phase(), Phase::Polling);
    assert!(controller.is_polling());

    // Tick fired: the request is outstanding and nothing else is scheduled.
    tokio::time::timeout(SETTLE_TIMEOUT, controller.next())
        .await
        .expect("tick fires");
    assert_eq!(controller.state().phase(), Phase::Polling);
    assert!(!controller.is_polling());

    let view = settle(&mut controller, &mut Vec::new()).await;
    assert_eq!(view.status, "PDF report opened.");
}

#[tokio::test]
async fn polling_error_is_reported_once() {
    let server = MockServer::start().await;
    mount_generate(&server, "t3").await;
    Mock::given(method("GET"))
        .and(path("/progress/t3"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = Controller::new(
        client_for(&server),
        RecordingPresenter::default(),
        fast_config(Delivery::Fetch),
    );
    controller.submit(form());
    let view = settle(&mut controller, &mut Vec::new()).await;

    assert_eq!(view.status, "Error checking progress.");
    assert!(!controller.is_polling());
}

#[tokio::test]
async fn blocked_direct_html_is_retried_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>r</html>", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = Controller::new(
        client_for(&server),
        RecordingPresenter::blocked(),
        fast_config(Delivery::Fetch),
    );
    controller.submit(form());
    let view = settle(&mut controller, &mut Vec::new()).await;

    assert_eq!(
        view.status,
        "Pop-up blocked. Please allow pop-ups and click Retry."
    );
    assert_eq!(view.severity, Severity::Warning);
    assert!(view.retry_visible);
    assert_eq!(controller.presenter().blocked_attempts, 1);

    controller.presenter_mut().blocked = false;
    controller.retry();
    let view = settle(&mut controller, &mut Vec::new()).await;

    assert_eq!(view.status, "HTML report opened.");
    assert!(!view.retry_visible);
    assert_eq!(
        controller.presenter().opened,
        vec!["html:<html>r</html>".to_string()]
    );
}

#[tokio::test]
async fn retry_blocked_again_keeps_retry_available() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("a,b\n", "text/csv")
                .insert_header("Content-Disposition", "attachment; filename=\"scores.csv\""),
        )
        .mount(&server)
        .await;

    let mut controller = Controller::new(
        client_for(&server),
        RecordingPresenter::blocked(),
        fast_config(Delivery::Fetch),
    );
    controller.submit(form());
    settle(&mut controller, &mut Vec::new()).await;

    controller.retry();
    let view = settle(&mut controller, &mut Vec::new()).await;
    assert_eq!(
        view.status,
        "Pop-up blocked again. Please allow pop-ups to view the report."
    );
    assert!(view.retry_visible);

    controller.presenter_mut().blocked = false;
    controller.retry();
    let view = settle(&mut controller, &mut Vec::new()).await;
    assert_eq!(view.status, "Report downloaded as scores.csv.");
    assert_eq!(
        controller.presenter().opened,
        vec!["file:scores.csv:4".to_string()]
    );
}

#[tokio::test]
async fn resubmission_cancels_previous_polling() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "task_id": "old" })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "task_id": "new" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/progress/old"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "progress": 10, "message": "old run" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/progress/new"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "progress": 100, "message": "done" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/new"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF".to_vec(), "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = Controller::new(
        client_for(&server),
        RecordingPresenter::default(),
        fast_config(Delivery::Fetch),
    );
    controller.submit(form());
    tokio::time::timeout(SETTLE_TIMEOUT, async {
        loop {
            if let Some(view) = controller.next().await {
                if view.status == "old run" {
                    break;
                }
            }
        }
    })
    .await
    .expect("first task reports progress");
    assert!(controller.is_polling());

    controller.submit(form());
    let mut seen = Vec::new();
    let view = settle(&mut controller, &mut seen).await;

    assert!(!seen.iter().any(|status| status == "old run"));
    assert_eq!(view.status, "PDF report opened.");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(progress_requests(&server, "old").await, 1);
}

#[tokio::test]
async fn location_delivery_retries_the_download_url() {
    let server = MockServer::start().await;
    mount_generate(&server, "t9").await;
    Mock::given(method("GET"))
        .and(path("/progress/t9"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "progress": 100, "message": "done" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/t9"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF".to_vec(), "application/pdf"))
        .expect(0)
        .mount(&server)
        .await;

    let mut controller = Controller::new(
        client_for(&server),
        RecordingPresenter::blocked(),
        fast_config(Delivery::OpenLocation),
    );
    controller.submit(form());
    let view = settle(&mut controller, &mut Vec::new()).await;
    assert!(view.retry_visible);
    assert_eq!(view.task_id.as_deref(), Some("t9"));

    controller.presenter_mut().blocked = false;
    controller.retry();
    let view = settle(&mut controller, &mut Vec::new()).await;

    assert_eq!(view.status, "Report opened.");
    assert_eq!(
        controller.presenter().opened,
        vec![format!("url:{}/download/t9", server.uri())]
    );
}

#[tokio::test]
async fn retry_without_history_warns() {
    let server = MockServer::start().await;
    let mut controller = Controller::new(
        client_for(&server),
        RecordingPresenter::default(),
        fast_config(Delivery::Fetch),
    );

    let view = controller.retry().expect("status changes");
    assert_eq!(view.status, "No previous task to retry.");
    assert_eq!(view.severity, Severity::Warning);
    assert!(!controller.state().is_busy());
}
