/*
 * Persists a merged document to a user-chosen path. The write is atomic: the
 * text goes into a temporary file next to the destination which is then
 * renamed over it, so a failed export never leaves a half-written file.
 */
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

#[derive(Debug)]
pub enum ExportError {
    NothingToExport,
    WriteFailed(io::Error),
}

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::WriteFailed(err)
    }
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::NothingToExport => {
                write!(f, "Nothing to export. Please merge files first.")
            }
            ExportError::WriteFailed(e) => write!(f, "Export failed: {e}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::WriteFailed(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;

pub trait ExporterOperations: Send + Sync {
    /*
     * Writes `document` verbatim to `destination`, replacing any existing file.
     * An empty document is a usage error and nothing is written.
     */
    fn export(&self, document: &str, destination: &Path) -> Result<()>;
}

pub struct CoreExporter {}

impl CoreExporter {
    pub fn new() -> Self {
        CoreExporter {}
    }
}

impl Default for CoreExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExporterOperations for CoreExporter {
    fn export(&self, document: &str, destination: &Path) -> Result<()> {
        if document.is_empty() {
            log::warn!("Exporter: Refusing to export an empty document to {destination:?}.");
            return Err(ExportError::NothingToExport);
        }

        let parent_dir = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        log::debug!(
            "Exporter: Writing {} bytes to {destination:?} via temp file in {parent_dir:?}.",
            document.len()
        );

        let mut temp_file = NamedTempFile::new_in(parent_dir)?;
        temp_file.write_all(document.as_bytes())?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(destination).map_err(|e| e.error)?;

        log::info!("Exporter: Exported merged document to {destination:?}.");
        Ok(())
    }
}
