//! Typed analysis settings.
//!
//! Defaults mirror the long-standing command-line defaults: `:` separator,
//! three prefix levels, top 50, progress every five seconds.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Key-namespace aggregation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct PrefixSettings {
    /// Segment separator. Empty disables namespace aggregation.
    pub separator: String,

    /// Deepest prefix level to record. Zero disables namespace aggregation.
    pub max_depth: usize,
}

impl Default for PrefixSettings {
    fn default() -> Self {
        Self {
            separator: ":".to_string(),
            max_depth: 3,
        }
    }
}

impl PrefixSettings {
    /// Whether namespace aggregation will record anything.
    pub fn enabled(&self) -> bool {
        !self.separator.is_empty() && self.max_depth > 0
    }
}

/// Settings consumed by the aggregation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzeSettings {
    /// Namespace aggregation.
    pub prefix: PrefixSettings,

    /// Size of the big-key list and truncation length of prefix lists.
    /// Zero disables big-key tracking and prefix truncation.
    pub top_n: usize,

    /// Minimum milliseconds between progress lines. Zero disables progress.
    pub progress_interval_ms: u64,
}

impl Default for AnalyzeSettings {
    fn default() -> Self {
        Self {
            prefix: PrefixSettings::default(),
            top_n: 50,
            progress_interval_ms: 5_000,
        }
    }
}

impl AnalyzeSettings {
    /// Progress throttle interval.
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

/// Per-field overrides collected from command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub separator: Option<String>,
    pub max_depth: Option<usize>,
    pub top_n: Option<usize>,
    pub progress_interval: Option<Duration>,
}

impl SettingsOverrides {
    /// Apply every present override to `settings`.
    pub fn apply(&self, settings: &mut AnalyzeSettings) {
        if let Some(separator) = &self.separator {
            settings.prefix.separator = separator.clone();
        }
        if let Some(depth) = self.max_depth {
            settings.prefix.max_depth = depth;
        }
        if let Some(top_n) = self.top_n {
            settings.top_n = top_n;
        }
        if let Some(interval) = self.progress_interval {
            settings.progress_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        }
    }

    /// Whether any override is present.
    pub fn is_empty(&self) -> bool {
        self.separator.is_none()
            && self.max_depth.is_none()
            && self.top_n.is_none()
            && self.progress_interval.is_none()
    }
}
