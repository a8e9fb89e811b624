use crate::{SharedStylesheetData, SourceError, StylesheetSource};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// An in-memory stylesheet source.
///
/// Sheets must be added before use. Locations are matched exactly, so
/// imports should be registered under their resolved location.
#[derive(Debug, Default)]
pub struct InMemoryStylesheetSource {
    sheets: RwLock<HashMap<String, SharedStylesheetData>>,
}

impl InMemoryStylesheetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a stylesheet.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::LoadFailed` if the internal lock is poisoned.
    pub fn add(&self, location: impl Into<String>, data: Vec<u8>) -> Result<(), SourceError> {
        let location = location.into();
        let mut sheets = self.sheets.write().map_err(|_| SourceError::LoadFailed {
            location: location.clone(),
            message: "stylesheet store lock poisoned".to_string(),
        })?;
        sheets.insert(location, Arc::new(data));
        Ok(())
    }

    /// Builder-style variant of [`add`](Self::add) for fixtures.
    pub fn with_sheet(mut self, location: impl Into<String>, css: &str) -> Self {
        if let Ok(sheets) = self.sheets.get_mut() {
            sheets.insert(location.into(), Arc::new(css.as_bytes().to_vec()));
        }
        self
    }

    pub fn remove(&self, location: &str) -> Option<SharedStylesheetData> {
        self.sheets.write().ok()?.remove(location)
    }

    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.sheets.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StylesheetSource for InMemoryStylesheetSource {
    fn load(&self, location: &str) -> Result<SharedStylesheetData, SourceError> {
        let sheets = self.sheets.read().map_err(|_| SourceError::LoadFailed {
            location: location.to_string(),
            message: "stylesheet store lock poisoned".to_string(),
        })?;
        sheets
            .get(location)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(location.to_string()))
    }

    fn exists(&self, location: &str) -> bool {
        self.sheets
            .read()
            .map(|s| s.contains_key(location))
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "InMemoryStylesheetSource"
    }
}
