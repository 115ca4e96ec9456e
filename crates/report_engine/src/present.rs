use report_core::{Artifact, PresentOutcome};
use report_logging::{report_info, report_warn};

/// Where a presented report ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextHandle {
    pub location: String,
}

impl ContextHandle {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }
}

/// A surface that can open new browsing contexts. Every method returns
/// `None` when no context could be obtained (the popup was blocked).
pub trait Presenter {
    /// Open a PDF document in a new context.
    fn open_pdf(&mut self, bytes: &[u8]) -> Option<ContextHandle>;

    /// Write an HTML document directly into a new context.
    fn write_html(&mut self, document: &str) -> Option<ContextHandle>;

    /// Hand a generic file to the native download mechanism.
    fn download(&mut self, filename: &str, bytes: &[u8]) -> Option<ContextHandle>;

    /// Open a URL in a new context, letting it fetch the report.
    fn open_location(&mut self, url: &str) -> Option<ContextHandle>;
}

/// Runs exactly one presentation path for the artifact.
pub fn present_artifact(presenter: &mut dyn Presenter, artifact: &Artifact) -> PresentOutcome {
    let handle = match artifact {
        Artifact::Pdf { bytes } => presenter.open_pdf(bytes),
        Artifact::Html { document } => presenter.write_html(document),
        Artifact::Other { filename, bytes } => presenter.download(filename, bytes),
    };
    outcome(handle, artifact.kind())
}

pub fn present_location(presenter: &mut dyn Presenter, url: &str) -> PresentOutcome {
    outcome(presenter.open_location(url), url)
}

fn outcome(handle: Option<ContextHandle>, what: impl std::fmt::Debug) -> PresentOutcome {
    match handle {
        Some(handle) => {
            report_info!("presented {:?} at {}", what, handle.location);
            PresentOutcome::Opened
        }
        None => {
            report_warn!("no browsing context for {:?}", what);
            PresentOutcome::Blocked
        }
    }
}
