//! Turns a frozen [`AggregateState`] into a [`Report`].
//!
//! Pure: the state is borrowed, so assembling twice yields identical output.
//! Equal sizes keep the map's key order; no further tie-break is applied.

use rv_common::report::format_timestamp;
use rv_common::{
    BigKeyRecord, Bucket, PrefixStat, PrefixTypeGroup, Report, ReportMeta, Summary, TypeStat,
};

use super::accumulator::AggregateState;
use super::buckets::{size_labels, ttl_labels};
use super::prefix::PrefixAggregate;

/// Build the report. `top_n` truncates prefix lists when non-zero.
pub fn assemble(state: &AggregateState, meta: ReportMeta, top_n: usize) -> Report {
    let mut types: Vec<TypeStat> = state
        .types
        .iter()
        .map(|(name, totals)| TypeStat {
            key_type: name.clone(),
            count: totals.count,
            size: totals.size,
        })
        .collect();
    types.sort_by(|a, b| b.size.cmp(&a.size));

    let summary = Summary {
        total_keys: state.total_keys,
        total_size: state.total_size,
        db_count: state.db_keys.len(),
        db_keys: state.db_keys.clone(),
        with_ttl: state.with_ttl,
        no_ttl: state.no_ttl,
        expired: state.expired,
        now: format_timestamp(state.now),
        type_counts: state
            .types
            .iter()
            .map(|(name, totals)| (name.clone(), totals.count))
            .collect(),
    };

    let ttl_buckets = ttl_labels()
        .map(|label| bucket(label, state.ttl_counts.get(label).copied()))
        .collect();
    let size_buckets = size_labels()
        .map(|label| bucket(label, state.size_counts.get(label).copied()))
        .collect();

    // BTreeMap iteration is already ordered by type name.
    let prefixes_by_type = state
        .prefixes
        .by_type()
        .iter()
        .map(|(name, map)| PrefixTypeGroup {
            key_type: name.clone(),
            prefixes: ranked_prefixes(map, top_n),
        })
        .collect();

    let bigkeys: Vec<BigKeyRecord> = state.bigkeys.sorted().into_iter().cloned().collect();

    Report {
        meta,
        summary,
        types,
        ttl_buckets,
        size_buckets,
        prefixes: ranked_prefixes(state.prefixes.global(), top_n),
        prefixes_by_type,
        bigkeys,
    }
}

fn bucket(label: &str, count: Option<u64>) -> Bucket {
    Bucket {
        label: label.to_string(),
        count: count.unwrap_or(0),
    }
}

/// Prefixes by descending size, truncated to `top_n` when non-zero.
fn ranked_prefixes(map: &PrefixAggregate, top_n: usize) -> Vec<PrefixStat> {
    let mut items: Vec<PrefixStat> = map
        .iter()
        .map(|(prefix, totals)| PrefixStat {
            prefix: prefix.clone(),
            count: totals.count,
            size: totals.size,
        })
        .collect();
    items.sort_by(|a, b| b.size.cmp(&a.size));
    if top_n > 0 {
        items.truncate(top_n);
    }
    items
}
