//! Filesystem-backed stylesheet source.
//!
//! Relative locations are joined to a base directory (the style directory).
//! Unlike a sandboxed resource provider this one does not confine reads to the
//! base: imports such as `../common.css` are ordinary.

use crate::{SharedStylesheetData, SourceError, StylesheetSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FilesystemStylesheetSource {
    base_path: PathBuf,
}

impl FilesystemStylesheetSource {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base_path
    }

    fn resolve_path(&self, location: &str) -> PathBuf {
        let location = location.strip_prefix("file://").unwrap_or(location);
        let path = Path::new(location);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }
}

impl Default for FilesystemStylesheetSource {
    fn default() -> Self {
        Self::new(".")
    }
}

impl StylesheetSource for FilesystemStylesheetSource {
    fn load(&self, location: &str) -> Result<SharedStylesheetData, SourceError> {
        let path = self.resolve_path(location);
        log::trace!("Reading stylesheet {}", path.display());
        std::fs::read(&path).map(Arc::new).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound(location.to_string())
            } else {
                SourceError::LoadFailed {
                    location: location.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn exists(&self, location: &str) -> bool {
        self.resolve_path(location).is_file()
    }

    fn name(&self) -> &'static str {
        "FilesystemStylesheetSource"
    }
}
