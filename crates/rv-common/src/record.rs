//! Decoded snapshot entries.
//!
//! A snapshot decoder yields a stream of [`SourceEntry`] values. Only
//! [`SourceEntry::Key`] entries are records; auxiliary metadata and database
//! size hints never touch aggregate counters.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value type of a stored key.
///
/// Unknown type names are preserved verbatim in [`KeyType::Other`] so that a
/// newer decoder never breaks aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KeyType {
    String,
    List,
    Set,
    ZSet,
    Hash,
    Stream,
    Module,
    Other(String),
}

impl KeyType {
    /// Canonical lowercase name, as written in reports.
    pub fn as_str(&self) -> &str {
        match self {
            KeyType::String => "string",
            KeyType::List => "list",
            KeyType::Set => "set",
            KeyType::ZSet => "zset",
            KeyType::Hash => "hash",
            KeyType::Stream => "stream",
            KeyType::Module => "module",
            KeyType::Other(name) => name,
        }
    }
}

impl From<&str> for KeyType {
    fn from(s: &str) -> Self {
        match s {
            "string" => KeyType::String,
            "list" => KeyType::List,
            "set" => KeyType::Set,
            "zset" | "sortedset" => KeyType::ZSet,
            "hash" => KeyType::Hash,
            "stream" => KeyType::Stream,
            "module" => KeyType::Module,
            other => KeyType::Other(other.to_string()),
        }
    }
}

impl From<String> for KeyType {
    fn from(s: String) -> Self {
        KeyType::from(s.as_str())
    }
}

impl From<KeyType> for String {
    fn from(t: KeyType) -> Self {
        match t {
            KeyType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded key and its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RecordEvent {
    /// Logical database index.
    pub db: u32,

    /// Key name. Records with an empty key are dropped by the accumulator.
    pub key: String,

    /// Value type.
    #[serde(rename = "type")]
    #[schemars(with = "String")]
    pub key_type: KeyType,

    /// Encoded on-disk footprint in bytes.
    pub size: u64,

    /// Internal representation label (e.g. "listpack", "hashtable").
    #[serde(default)]
    pub encoding: String,

    /// Number of elements held by the value.
    #[serde(default, rename = "elements")]
    pub element_count: u64,

    /// Absolute expiration time, if the key has a TTL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
}

impl RecordEvent {
    /// Create a record with no TTL and empty encoding.
    pub fn new(db: u32, key: impl Into<String>, key_type: KeyType, size: u64) -> Self {
        Self {
            db,
            key: key.into(),
            key_type,
            size,
            encoding: String::new(),
            element_count: 0,
            expiration: None,
        }
    }

    /// Set the encoding label.
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Set the element count.
    pub fn with_elements(mut self, count: u64) -> Self {
        self.element_count = count;
        self
    }

    /// Set the absolute expiration time.
    pub fn with_expiration(mut self, at: DateTime<Utc>) -> Self {
        self.expiration = Some(at);
        self
    }
}

/// Auxiliary metadata field carried in the snapshot header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AuxEntry {
    pub key: String,
    pub value: String,
}

/// A single entry yielded by a snapshot decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceEntry {
    /// A stored key.
    Key(RecordEvent),

    /// Header metadata (tool version, creation time, memory usage).
    Aux(AuxEntry),

    /// Database size hint preceding a database's keys.
    DbSize {
        db: u32,
        #[serde(default)]
        keys: u64,
        #[serde(default)]
        expires: u64,
    },
}
