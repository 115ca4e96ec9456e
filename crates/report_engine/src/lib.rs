//! Report engine: HTTP client, poll timer and effect execution.
mod client;
mod controller;
mod decode;
mod filename;
mod persist;
mod poll;
mod present;
mod settings;
mod types;

pub use client::{artifact_from_parts, ReportClient, ReqwestReportClient};
pub use controller::Controller;
pub use decode::{decode_document, DecodeError, DecodedDocument};
pub use filename::{content_file_name, download_file_name};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use poll::PollTimer;
pub use present::{present_artifact, present_location, ContextHandle, Presenter};
pub use settings::{ClientSettings, DEFAULT_BASE_URL, DEFAULT_MAX_BYTES};
pub use types::{ClientError, FailureKind, HealthStatus};
