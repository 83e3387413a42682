//! Human renderings of a report.

use std::fmt::Write;

use humansize::{format_size, BINARY};
use rv_common::{Bucket, Report};

/// Number of rows shown per table in the Markdown rendering.
const MAX_ROWS: usize = 20;

/// One line for quick status checks.
pub fn render_summary_line(report: &Report) -> String {
    let mut line = format!(
        "{}: {} keys, {} in {} db(s); {} with TTL, {} expired; {} big keys",
        report.meta.source,
        report.summary.total_keys,
        format_size(report.summary.total_size, BINARY),
        report.summary.db_count,
        report.summary.with_ttl,
        report.summary.expired,
        report.bigkeys.len()
    );
    if report.meta.partial {
        line.push_str(" (partial)");
    }
    line
}

/// Markdown rendering of the whole report.
pub fn render_markdown(report: &Report) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_markdown(&mut out, report);
    out
}

fn write_markdown(out: &mut String, report: &Report) -> std::fmt::Result {
    let meta = &report.meta;
    let summary = &report.summary;

    writeln!(out, "# rdbviz report")?;
    writeln!(out)?;
    writeln!(out, "Source: `{}`", meta.source)?;
    writeln!(out, "Generated: {}", meta.generated_at)?;
    if let Some(version) = &meta.redis_version {
        writeln!(out, "Redis version: {}", version)?;
    }
    if let Some(used) = &meta.used_mem {
        match used.parse::<u64>() {
            Ok(bytes) => writeln!(out, "Used memory: {}", format_size(bytes, BINARY))?,
            Err(_) => writeln!(out, "Used memory: {}", used)?,
        }
    }
    if meta.partial {
        writeln!(out)?;
        writeln!(out, "> **Partial report**: the scan stopped before the end of the input.")?;
    }

    writeln!(out)?;
    writeln!(out, "## Summary")?;
    writeln!(out)?;
    writeln!(out, "| Metric | Value |")?;
    writeln!(out, "|---|---|")?;
    writeln!(out, "| Keys | {} |", summary.total_keys)?;
    writeln!(out, "| Size | {} |", format_size(summary.total_size, BINARY))?;
    writeln!(out, "| Databases | {} |", summary.db_count)?;
    writeln!(out, "| With TTL | {} |", summary.with_ttl)?;
    writeln!(out, "| No TTL | {} |", summary.no_ttl)?;
    writeln!(out, "| Expired | {} |", summary.expired)?;
    writeln!(out, "| Reference time | {} |", summary.now)?;

    if !report.types.is_empty() {
        writeln!(out)?;
        writeln!(out, "## Types")?;
        writeln!(out)?;
        writeln!(out, "| Type | Keys | Size |")?;
        writeln!(out, "|---|---|---|")?;
        for t in &report.types {
            writeln!(
                out,
                "| {} | {} | {} |",
                t.key_type,
                t.count,
                format_size(t.size, BINARY)
            )?;
        }
    }

    write_buckets(out, "TTL distribution", &report.ttl_buckets)?;
    write_buckets(out, "Size distribution", &report.size_buckets)?;

    if !report.prefixes.is_empty() {
        writeln!(out)?;
        writeln!(out, "## Top prefixes")?;
        writeln!(out)?;
        writeln!(out, "| Prefix | Keys | Size |")?;
        writeln!(out, "|---|---|---|")?;
        for p in report.prefixes.iter().take(MAX_ROWS) {
            writeln!(
                out,
                "| `{}` | {} | {} |",
                p.prefix,
                p.count,
                format_size(p.size, BINARY)
            )?;
        }
    }

    if !report.bigkeys.is_empty() {
        writeln!(out)?;
        writeln!(out, "## Big keys")?;
        writeln!(out)?;
        writeln!(out, "| DB | Key | Type | Size | Encoding | Elements | Expires |")?;
        writeln!(out, "|---|---|---|---|---|---|---|")?;
        for k in report.bigkeys.iter().take(MAX_ROWS) {
            let expires = k
                .expiration
                .map(rv_common::format_timestamp)
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                out,
                "| {} | `{}` | {} | {} | {} | {} | {} |",
                k.db,
                k.key,
                k.key_type,
                format_size(k.size, BINARY),
                k.encoding,
                k.elements,
                expires
            )?;
        }
    }

    Ok(())
}

fn write_buckets(out: &mut String, title: &str, buckets: &[Bucket]) -> std::fmt::Result {
    if buckets.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "## {}", title)?;
    writeln!(out)?;
    writeln!(out, "| Bucket | Keys |")?;
    writeln!(out, "|---|---|")?;
    for b in buckets {
        writeln!(out, "| {} | {} |", b.label, b.count)?;
    }
    Ok(())
}
