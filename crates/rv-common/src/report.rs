//! Report document schema.
//!
//! These types are a compatibility boundary: the charting front end reads
//! the serialized report by field name and relies on the list orderings the
//! assembler produces. Every map reachable from [`Report`] is a `BTreeMap`
//! so that serialization is deterministic.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::record::RecordEvent;

/// Source and generation metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportMeta {
    /// Absolute path of the analyzed input.
    pub source: String,

    /// Generation time (RFC 3339, seconds precision).
    pub generated_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis_bits: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctime: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_mem: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aof_base: Option<String>,

    /// Every auxiliary field seen in the snapshot header.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aux: BTreeMap<String, String>,

    /// Set when the run stopped before the end of the input.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub partial: bool,
}

impl ReportMeta {
    /// Create metadata for a source path and generation timestamp.
    pub fn new(source: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            source: source.into(),
            generated_at: format_timestamp(generated_at),
            ..Default::default()
        }
    }

    /// Record an auxiliary header field, promoting well-known keys.
    pub fn record_aux(&mut self, key: &str, value: &str) {
        let key = key.trim();
        let value = value.trim();
        self.aux.insert(key.to_string(), value.to_string());
        let slot = match key {
            "redis-ver" => &mut self.redis_version,
            "redis-bits" => &mut self.redis_bits,
            "ctime" => &mut self.ctime,
            "used-mem" => &mut self.used_mem,
            "aof-base" => &mut self.aof_base,
            _ => return,
        };
        *slot = Some(value.to_string());
    }
}

/// Finalized summary counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    pub total_keys: u64,
    pub total_size: u64,
    /// Number of distinct databases that held at least one key.
    pub db_count: usize,
    pub db_keys: BTreeMap<u32, u64>,
    pub with_ttl: u64,
    pub no_ttl: u64,
    pub expired: u64,
    /// Reference time used for TTL classification.
    pub now: String,
    pub type_counts: BTreeMap<String, u64>,
}

/// Count and size for one value type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TypeStat {
    #[serde(rename = "type")]
    pub key_type: String,
    pub count: u64,
    pub size: u64,
}

/// One labelled histogram bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Bucket {
    pub label: String,
    pub count: u64,
}

/// Count and size under one key-namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PrefixStat {
    pub prefix: String,
    pub count: u64,
    pub size: u64,
}

/// Prefix statistics restricted to one value type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PrefixTypeGroup {
    #[serde(rename = "type")]
    pub key_type: String,
    pub prefixes: Vec<PrefixStat>,
}

/// A retained large key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BigKeyRecord {
    pub db: u32,
    pub key: String,
    #[serde(rename = "type")]
    pub key_type: String,
    pub size: u64,
    pub encoding: String,
    pub elements: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
}

impl From<&RecordEvent> for BigKeyRecord {
    fn from(event: &RecordEvent) -> Self {
        BigKeyRecord {
            db: event.db,
            key: event.key.clone(),
            key_type: event.key_type.to_string(),
            size: event.size,
            encoding: event.encoding.clone(),
            elements: event.element_count,
            expiration: event.expiration,
        }
    }
}

/// The complete analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Report {
    pub meta: ReportMeta,
    pub summary: Summary,
    pub types: Vec<TypeStat>,
    pub ttl_buckets: Vec<Bucket>,
    pub size_buckets: Vec<Bucket>,
    pub prefixes: Vec<PrefixStat>,
    pub prefixes_by_type: Vec<PrefixTypeGroup>,
    pub bigkeys: Vec<BigKeyRecord>,
}

impl Report {
    /// Serialize to pretty JSON with a trailing newline.
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Parse a previously written report.
    pub fn from_json(content: &str) -> crate::Result<Self> {
        serde_json::from_str(content).map_err(|e| crate::Error::InvalidReport(e.to_string()))
    }
}

/// Format a timestamp the way reports record it.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
