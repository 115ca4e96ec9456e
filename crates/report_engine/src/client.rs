use futures_util::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::StatusCode;
use url::Url;

use report_core::{
    disposition_filename, Artifact, ContentKind, FormData, ProgressSnapshot, SubmitReply, TaskId,
};
use report_logging::{report_debug, report_trace};

use crate::decode::decode_document;
use crate::types::{GenerateReply, ProgressReply};
use crate::{ClientError, ClientSettings, FailureKind, HealthStatus};

/// The server side of the report lifecycle.
#[async_trait::async_trait]
pub trait ReportClient: Send + Sync {
    /// `POST /generate` with the form as multipart text fields.
    async fn submit(&self, form: &FormData) -> Result<SubmitReply, ClientError>;

    /// `GET /progress/{task_id}`.
    async fn progress(&self, task_id: &TaskId) -> Result<ProgressSnapshot, ClientError>;

    /// `GET /download/{task_id}`, classified by content type.
    async fn download(&self, task_id: &TaskId) -> Result<Artifact, ClientError>;

    /// Location a browsing context can open to fetch the report itself.
    fn download_url(&self, task_id: &TaskId) -> String;

    /// `GET /service/healthz`.
    async fn health(&self) -> Result<HealthStatus, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestReportClient {
    settings: ClientSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestReportClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::new(
                FailureKind::InvalidUrl,
                format!("{base} cannot hold endpoint paths"),
            ));
        }

        let mut builder = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit));
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base,
            client,
        })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get(&self, url: Url) -> Result<(StatusCode, HeaderMap, Vec<u8>), ClientError> {
        report_trace!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        self.read(response).await
    }

    /// Reads the whole body, enforcing `max_bytes`.
    async fn read(
        &self,
        response: reqwest::Response,
    ) -> Result<(StatusCode, HeaderMap, Vec<u8>), ClientError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            body.extend_from_slice(&chunk);
        }
        Ok((status, headers, body))
    }
}

#[async_trait::async_trait]
impl ReportClient for ReqwestReportClient {
    async fn submit(&self, form: &FormData) -> Result<SubmitReply, ClientError> {
        let multipart = form
            .fields()
            .fold(reqwest::multipart::Form::new(), |multipart, (name, value)| {
                multipart.text(name.to_string(), value.to_string())
            });
        let response = self
            .client
            .post(self.endpoint(&["generate"]))
            .multipart(multipart)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let (status, headers, body) = self.read(response).await?;
        let content_type = header_str(&headers, CONTENT_TYPE);
        report_debug!(
            "generate replied {} ({}, {} bytes)",
            status,
            content_type.as_deref().unwrap_or("no content type"),
            body.len()
        );

        if !status.is_success() {
            return Err(rejection(status, content_type.as_deref(), &body));
        }
        match content_type.as_deref() {
            Some(ct) if !is_json(ct) => {
                artifact_from_parts(&headers, body).map(SubmitReply::Delivered)
            }
            _ => parse_generate_reply(&body),
        }
    }

    async fn progress(&self, task_id: &TaskId) -> Result<ProgressSnapshot, ClientError> {
        let (status, _, body) = self
            .get(self.endpoint(&["progress", task_id.as_str()]))
            .await?;
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let reply: ProgressReply = serde_json::from_slice(&body)
            .map_err(|err| ClientError::new(FailureKind::InvalidJson, err.to_string()))?;
        Ok(ProgressSnapshot::new(
            reply.progress.floor() as i64,
            reply.message.unwrap_or_default(),
        ))
    }

    async fn download(&self, task_id: &TaskId) -> Result<Artifact, ClientError> {
        let (status, headers, body) = self
            .get(self.endpoint(&["download", task_id.as_str()]))
            .await?;
        if !status.is_success() {
            let content_type = header_str(&headers, CONTENT_TYPE);
            return Err(rejection(status, content_type.as_deref(), &body));
        }
        artifact_from_parts(&headers, body)
    }

    fn download_url(&self, task_id: &TaskId) -> String {
        self.endpoint(&["download", task_id.as_str()]).to_string()
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        let (status, _, body) = self.get(self.endpoint(&["service", "healthz"])).await?;
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        serde_json::from_slice(&body)
            .map_err(|err| ClientError::new(FailureKind::InvalidJson, err.to_string()))
    }
}

/// Builds the artifact for a finished report body. Exactly one variant per
/// declared content type; no declared type is an error.
pub fn artifact_from_parts(headers: &HeaderMap, body: Vec<u8>) -> Result<Artifact, ClientError> {
    let Some(content_type) = header_str(headers, CONTENT_TYPE) else {
        return Err(ClientError::new(
            FailureKind::MissingContentType,
            "response has no Content-Type",
        ));
    };
    match ContentKind::from_content_type(&content_type) {
        ContentKind::Pdf => Ok(Artifact::Pdf { bytes: body }),
        ContentKind::Html => decode_document(&body, Some(&content_type))
            .map(|decoded| Artifact::Html {
                document: decoded.text,
            })
            .map_err(|err| ClientError::new(FailureKind::Decode, err.to_string())),
        ContentKind::Other => Ok(Artifact::Other {
            filename: disposition_filename(header_str(headers, CONTENT_DISPOSITION).as_deref()),
            bytes: body,
        }),
    }
}

fn parse_generate_reply(body: &[u8]) -> Result<SubmitReply, ClientError> {
    let reply: GenerateReply = serde_json::from_slice(body).map_err(|err| {
        report_debug!("generate body is not json: {}", err);
        ClientError::new(FailureKind::InvalidJson, "Invalid JSON response from server.")
    })?;
    match (reply.task_id, reply.error) {
        (Some(task_id), _) if !task_id.is_empty() => {
            Ok(SubmitReply::Accepted(TaskId::new(task_id)))
        }
        (_, Some(error)) => Err(ClientError::new(FailureKind::Rejected { status: 200 }, error)),
        _ => Err(ClientError::new(
            FailureKind::UnexpectedResponse,
            "Unexpected response from server.",
        )),
    }
}

/// Non-2xx reply: prefer the server's `{error}`, then its plain text, then
/// the status. HTML error pages are reduced to the status.
fn rejection(status: StatusCode, content_type: Option<&str>, body: &[u8]) -> ClientError {
    if let Ok(GenerateReply {
        error: Some(error), ..
    }) = serde_json::from_slice::<GenerateReply>(body)
    {
        return ClientError::new(
            FailureKind::Rejected {
                status: status.as_u16(),
            },
            error,
        );
    }
    let is_page = content_type
        .is_some_and(|ct| ContentKind::from_content_type(ct) == ContentKind::Html);
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    let message = if text.is_empty() || is_page {
        status.to_string()
    } else {
        text.to_string()
    };
    ClientError::new(FailureKind::HttpStatus(status.as_u16()), message)
}

fn header_str(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

fn is_json(content_type: &str) -> bool {
    let media = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();
    media.eq_ignore_ascii_case("application/json") || media.to_ascii_lowercase().ends_with("+json")
}

fn too_large(max_bytes: u64, actual: u64) -> ClientError {
    ClientError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return ClientError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
