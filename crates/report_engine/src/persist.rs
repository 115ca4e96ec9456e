use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot use {} for reports: {reason}", dir.display())]
    OutputDir { dir: PathBuf, reason: String },
    #[error("writing {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Creates the report directory if needed and checks that files can be
/// created in it.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |reason: String| PersistError::OutputDir {
        dir: dir.to_path_buf(),
        reason,
    };
    match fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => return Err(unusable("not a directory".into())),
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|err| unusable(err.to_string()))?;
        }
        Err(err) => return Err(unusable(err.to_string())),
    }
    partial_file(dir).map_err(|err| unusable(err.to_string()))?;
    Ok(())
}

/// Writes report files into one directory so a reader never sees a partial
/// file: content goes to a `.report-*.part` file that is renamed over the
/// target.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let failed = |source: io::Error| PersistError::Write {
            path: target.clone(),
            source,
        };
        let mut part = partial_file(&self.dir).map_err(failed)?;
        part.write_all(content).map_err(failed)?;
        part.as_file_mut().sync_all().map_err(failed)?;
        part.persist(&target).map_err(|err| failed(err.error))?;
        Ok(target)
    }
}

fn partial_file(dir: &Path) -> io::Result<NamedTempFile> {
    Builder::new()
        .prefix(".report-")
        .suffix(".part")
        .tempfile_in(dir)
}
