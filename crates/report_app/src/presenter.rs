use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use report_engine::{
    content_file_name, download_file_name, AtomicFileWriter, ContextHandle, Presenter,
};
use report_logging::{report_debug, report_error, report_warn};

/// Presents reports as files in the output directory, optionally handing
/// each one to an external opener. A failed write or launch counts as a
/// blocked context.
#[derive(Debug)]
pub struct FilePresenter {
    writer: AtomicFileWriter,
    opener: Option<String>,
    written: Vec<PathBuf>,
}

impl FilePresenter {
    pub fn new(output_dir: PathBuf, opener: Option<String>) -> Self {
        Self {
            writer: AtomicFileWriter::new(output_dir),
            opener: opener.filter(|opener| !opener.trim().is_empty()),
            written: Vec::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        self.writer.dir()
    }

    /// Files written so far, oldest first.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn store(&mut self, filename: &str, bytes: &[u8]) -> Option<ContextHandle> {
        let path = match self.writer.write(filename, bytes) {
            Ok(path) => path,
            Err(err) => {
                report_error!("could not write {}: {}", filename, err);
                return None;
            }
        };
        report_debug!("wrote {} bytes to {}", bytes.len(), path.display());
        self.written.push(path.clone());
        self.launch(path.as_os_str())?;
        Some(ContextHandle::new(path.display().to_string()))
    }

    fn launch(&self, target: &OsStr) -> Option<()> {
        let Some(opener) = &self.opener else {
            return Some(());
        };
        let spawned = Command::new(opener)
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(mut child) => {
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
                Some(())
            }
            Err(err) => {
                report_warn!("opener {} could not be launched: {}", opener, err);
                None
            }
        }
    }
}

impl Presenter for FilePresenter {
    fn open_pdf(&mut self, bytes: &[u8]) -> Option<ContextHandle> {
        self.store(&content_file_name(bytes, "pdf"), bytes)
    }

    fn write_html(&mut self, document: &str) -> Option<ContextHandle> {
        let bytes = document.as_bytes();
        self.store(&content_file_name(bytes, "html"), bytes)
    }

    fn download(&mut self, filename: &str, bytes: &[u8]) -> Option<ContextHandle> {
        self.store(&download_file_name(filename), bytes)
    }

    fn open_location(&mut self, url: &str) -> Option<ContextHandle> {
        if self.opener.is_none() {
            println!("Report available at {url}");
        }
        self.launch(OsStr::new(url))?;
        Some(ContextHandle::new(url))
    }
}
