//! Photo record bundle for saved survey sessions.

use crate::annotations::Annotation;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// Record persistence errors.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// One marked-up photo as stored in a session bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: Uuid,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Survey section the photo belongs to.
    pub section: String,
    /// Free-text caption.
    pub annotation: String,
    /// Unmarked photo at natural resolution, as a data URL.
    pub original: String,
    /// Flattened marked-up surface, as a data URL.
    pub marked: String,
    /// Annotation snapshot, for reopening the markup.
    #[serde(default)]
    pub marks: Vec<Annotation>,
}

impl PhotoRecord {
    /// Create a record stamped with a fresh id and the current time.
    pub fn new(
        section: impl Into<String>,
        caption: impl Into<String>,
        original: String,
        marked: String,
        marks: Vec<Annotation>,
    ) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            id: Uuid::new_v4(),
            timestamp,
            section: section.into(),
            annotation: caption.into(),
            original,
            marked,
            marks,
        }
    }

    /// Serialize the record to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a record from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Write the record to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), RecordError> {
        let json = self
            .to_json()
            .map_err(|e| RecordError::Serialization(e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| RecordError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// Read a record from a JSON file.
    pub fn load(path: &Path) -> Result<Self, RecordError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| RecordError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json).map_err(|e| {
            RecordError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}
