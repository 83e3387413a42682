//! JSON Schema generation for the report and input formats.
//!
//! Consumers of the report (charting front ends, agents) can validate
//! against these schemas or generate bindings from them.
//!
//! # Usage
//!
//! ```bash
//! # List available schema types
//! rdbviz schema --list
//!
//! # Generate schema for a specific type
//! rdbviz schema Report
//!
//! # Generate all schemas
//! rdbviz schema --all
//! ```

use schemars::schema_for;
use serde_json::Value;
use std::collections::BTreeMap;

pub use crate::events::{Phase, ProgressEvent};
pub use rv_common::{
    AuxEntry, BigKeyRecord, Bucket, PrefixStat, PrefixTypeGroup, RecordEvent, Report, ReportMeta,
    SourceEntry, Summary, TypeStat,
};
pub use rv_config::{AnalyzeSettings, PrefixSettings};

/// Available schema types with their descriptions.
pub fn available_schemas() -> Vec<(&'static str, &'static str)> {
    vec![
        // Report document
        ("Report", "Complete analysis report"),
        ("ReportMeta", "Source and generation metadata"),
        ("Summary", "Finalized summary counters"),
        ("TypeStat", "Count and size for one value type"),
        ("Bucket", "One labelled histogram bucket"),
        ("PrefixStat", "Count and size under one key prefix"),
        ("PrefixTypeGroup", "Prefix statistics for one value type"),
        ("BigKeyRecord", "A retained large key"),
        // Input records
        ("SourceEntry", "One line of decoder output"),
        ("RecordEvent", "One decoded key and its metadata"),
        ("AuxEntry", "Auxiliary header field"),
        // Settings
        ("AnalyzeSettings", "Settings file contents"),
        ("PrefixSettings", "Prefix grouping settings"),
        // Progress stream
        ("ProgressEvent", "JSONL progress event"),
        ("Phase", "Pipeline phase of a progress event"),
    ]
}

/// Generate JSON Schema for a type by name.
///
/// Returns the schema as a serde_json::Value, or None if the type is unknown.
pub fn generate_schema(type_name: &str) -> Option<Value> {
    let schema = match type_name {
        "Report" => schema_for!(Report),
        "ReportMeta" => schema_for!(ReportMeta),
        "Summary" => schema_for!(Summary),
        "TypeStat" => schema_for!(TypeStat),
        "Bucket" => schema_for!(Bucket),
        "PrefixStat" => schema_for!(PrefixStat),
        "PrefixTypeGroup" => schema_for!(PrefixTypeGroup),
        "BigKeyRecord" => schema_for!(BigKeyRecord),
        "SourceEntry" => schema_for!(SourceEntry),
        "RecordEvent" => schema_for!(RecordEvent),
        "AuxEntry" => schema_for!(AuxEntry),
        "AnalyzeSettings" => schema_for!(AnalyzeSettings),
        "PrefixSettings" => schema_for!(PrefixSettings),
        "ProgressEvent" => schema_for!(ProgressEvent),
        "Phase" => schema_for!(Phase),
        _ => return None,
    };

    serde_json::to_value(schema).ok()
}

/// Generate all schemas as a map from type name to schema.
pub fn generate_all_schemas() -> BTreeMap<String, Value> {
    let mut schemas = BTreeMap::new();
    for (name, _desc) in available_schemas() {
        if let Some(schema) = generate_schema(name) {
            schemas.insert(name.to_string(), schema);
        }
    }
    schemas
}

/// Schema output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    /// Pretty-printed JSON (default)
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

/// Format a schema value for output.
pub fn format_schema(schema: &Value, format: SchemaFormat) -> serde_json::Result<String> {
    match format {
        SchemaFormat::Json => serde_json::to_string_pretty(schema),
        SchemaFormat::JsonCompact => serde_json::to_string(schema),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_schemas_generate() {
        for (name, _desc) in available_schemas() {
            let schema = generate_schema(name);
            assert!(schema.is_some(), "Schema for '{}' should generate", name);
        }
    }

    #[test]
    fn test_unknown_schema_returns_none() {
        assert!(generate_schema("UnknownType").is_none());
        assert!(generate_schema("").is_none());
    }

    #[test]
    fn test_report_schema_lists_sections() {
        let schema = generate_schema("Report").unwrap();
        let props = schema["properties"].as_object().unwrap();
        for field in ["meta", "summary", "types", "prefixes", "bigkeys"] {
            assert!(props.contains_key(field), "missing {}", field);
        }
    }

    #[test]
    fn test_generate_all_schemas() {
        let all = generate_all_schemas();
        assert_eq!(all.len(), available_schemas().len());
        assert!(all.contains_key("Report"));
        assert!(all.contains_key("SourceEntry"));
    }

    #[test]
    fn test_format_schema() {
        let schema = generate_schema("Bucket").unwrap();

        let pretty = format_schema(&schema, SchemaFormat::Json).unwrap();
        let compact = format_schema(&schema, SchemaFormat::JsonCompact).unwrap();

        assert!(pretty.contains('\n'));
        assert!(!compact.contains('\n'));
    }
}
