use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use scrape_logging::{scrape_debug, scrape_info};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("invalid destination {0:?}: no file name")]
    InvalidDestination(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    #[default]
    None,
    Gzip,
}

impl From<bool> for Compression {
    fn from(compressed: bool) -> Self {
        if compressed {
            Compression::Gzip
        } else {
            Compression::None
        }
    }
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        scrape_debug!("creating output directory {:?}", dir);
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Writes a report to its destination through a temp file in the same
/// directory, renamed into place once fully written and synced. A failed
/// write leaves the destination untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomicReportWriter {
    compression: Compression,
}

impl AtomicReportWriter {
    pub fn new(compression: Compression) -> Self {
        Self { compression }
    }

    pub fn write(&self, destination: &Path, report: &str) -> Result<PathBuf, PersistError> {
        if destination.file_name().is_none() {
            return Err(PersistError::InvalidDestination(destination.to_path_buf()));
        }
        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        ensure_output_dir(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        match self.compression {
            Compression::None => tmp.write_all(report.as_bytes())?,
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(&mut tmp, flate2::Compression::default());
                encoder.write_all(report.as_bytes())?;
                encoder.finish()?;
            }
        }
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        if let Some(permissions) = target_permissions(destination) {
            tmp.as_file().set_permissions(permissions)?;
        }

        tmp.persist(destination).map_err(|e| PersistError::Io(e.error))?;
        scrape_info!(
            "report written to {:?} ({} bytes, {:?})",
            destination,
            report.len(),
            self.compression
        );
        Ok(destination.to_path_buf())
    }
}

/// Temp files are created owner-only. An existing report keeps its mode,
/// a new one gets the usual 0644.
fn target_permissions(destination: &Path) -> Option<fs::Permissions> {
    match fs::metadata(destination) {
        Ok(meta) if meta.is_file() => Some(meta.permissions()),
        _ => default_permissions(),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

/// Persist `report` as UTF-8 at `destination`, gzip-compressed when `compressed`.
pub fn persist_report(
    report: &str,
    destination: &Path,
    compressed: bool,
) -> Result<PathBuf, PersistError> {
    AtomicReportWriter::new(compressed.into()).write(destination, report)
}
