//! Settings snapshots for run provenance.
//!
//! A snapshot records exactly which settings produced a report so that a run
//! can be repeated later with the same inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::resolve::ConfigSource;
use crate::settings::AnalyzeSettings;

/// A frozen snapshot of effective settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Source of the settings file.
    pub source: String,

    /// Path the settings file was loaded from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the settings file content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,

    /// Effective settings after overrides.
    pub settings: AnalyzeSettings,
}

impl ConfigSnapshot {
    /// Create a new snapshot from resolved settings.
    pub fn new(
        settings: &AnalyzeSettings,
        source: &ConfigSource,
        path: Option<&Path>,
        content_hash: Option<String>,
    ) -> Self {
        ConfigSnapshot {
            timestamp: Utc::now(),
            source: source.to_string(),
            path: path.map(|p| p.display().to_string()),
            content_hash,
            settings: settings.clone(),
        }
    }

    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Short identifier (first 12 chars of the content hash, or "defaults").
    pub fn short_id(&self) -> &str {
        match &self.content_hash {
            Some(hash) => &hash[..12.min(hash.len())],
            None => "defaults",
        }
    }
}
