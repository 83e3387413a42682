//! rdbviz - snapshot analysis for key-value stores
//!
//! The main entry point for the `rdbviz` binary, handling:
//! - Streaming analysis of decoded snapshot records into a report
//! - Rendering existing reports
//! - JSON Schema output for report consumers
//! - Settings inspection and validation

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use rv_common::{
    format_error_human, Error, OutputFormat, Report, StructuredError, REPORT_SCHEMA_VERSION,
};
use rv_config::{
    format_duration, lint_settings, load_settings, parse_duration, ConfigError,
    ResolvedSettings, SettingsOptions, SettingsOverrides, ValidationError,
};
use rv_core::events::{
    event_names as progress_events, JsonlWriter, Phase, ProgressEmitter, ProgressEvent,
    TracingEmitter,
};
use rv_core::exit_codes::ExitCode;
use rv_core::log_event;
use rv_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogFormat, Stage,
};
use rv_core::render::{render_markdown, render_summary_line};
use rv_core::schema::{
    available_schemas, format_schema, generate_all_schemas, generate_schema, SchemaFormat,
};
use rv_core::source::JsonlSource;
use rv_core::{analyze, write_report, AnalyzeOptions};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// rdbviz - Aggregate decoded snapshot records into a visualization report
#[derive(Parser)]
#[command(name = "rdbviz")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Settings file (overrides RDBVIZ_CONFIG and the XDG location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format for stdout payloads
    #[arg(long, short = 'f', global = true, default_value = "md")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream decoded records and write a report
    Analyze(AnalyzeArgs),

    /// Render an existing report
    Summarize(SummarizeArgs),

    /// Print JSON Schema for report and input types
    Schema(SchemaArgs),

    /// Settings management
    Config(ConfigArgs),

    /// Print version information
    Version,
}

// ============================================================================
// Command argument structs
// ============================================================================

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Decoded snapshot records (JSON lines)
    #[arg(long, short = 'i', alias = "rdb")]
    input: PathBuf,

    /// Report destination
    #[arg(long, short = 'o')]
    out: PathBuf,

    /// Key prefix separator
    #[arg(long)]
    prefix_sep: Option<String>,

    /// Maximum prefix depth (0 disables prefix grouping)
    #[arg(long)]
    prefix_depth: Option<usize>,

    /// Number of big keys and top prefixes to keep
    #[arg(long = "topn")]
    top_n: Option<usize>,

    /// Progress interval, e.g. 5s, 500ms, 0 to disable
    #[arg(long, value_parser = parse_interval)]
    progress: Option<Duration>,

    /// Stop after this many keys and mark the report partial
    #[arg(long)]
    limit: Option<u64>,

    /// Reference time for TTL classification (RFC 3339)
    #[arg(long, value_parser = parse_now)]
    now: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
struct SummarizeArgs {
    /// Report written by `rdbviz analyze`
    report: PathBuf,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Type to print (see --list)
    name: Option<String>,

    /// List available types
    #[arg(long)]
    list: bool,

    /// Print every schema as one object keyed by type name
    #[arg(long)]
    all: bool,

    /// Single-line JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show effective settings and where they came from
    Show,
    /// Validate the settings file
    Validate,
}

fn parse_interval(s: &str) -> Result<Duration, String> {
    parse_duration(s)
        .ok_or_else(|| format!("invalid duration '{}' (examples: 5s, 500ms, 2m, 0)", s))
}

fn parse_now(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp '{}': {}", s, e))
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    let log_config = LogConfig::from_env(
        LogConfig::level_from_flags(cli.global.verbose, cli.global.quiet),
        cli.global.log_format,
    );
    init_logging(&log_config);

    let exit_code = match &cli.command {
        Commands::Analyze(args) => run_analyze(&cli.global, args),
        Commands::Summarize(args) => run_summarize(&cli.global, args),
        Commands::Schema(args) => run_schema(&cli.global, args),
        Commands::Config(args) => run_config(&cli.global, args),
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Clean
        }
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn progress_emitter(global: &GlobalOpts) -> Arc<dyn ProgressEmitter> {
    if global.format.is_machine() {
        Arc::new(JsonlWriter::new(std::io::stderr()))
    } else {
        Arc::new(TracingEmitter)
    }
}

fn settings_options(global: &GlobalOpts, args: Option<&AnalyzeArgs>) -> SettingsOptions {
    let overrides = match args {
        Some(args) => SettingsOverrides {
            separator: args.prefix_sep.clone(),
            max_depth: args.prefix_depth,
            top_n: args.top_n,
            progress_interval: args.progress,
        },
        None => SettingsOverrides::default(),
    };
    SettingsOptions {
        path: global.config.clone(),
        overrides,
    }
}

fn log_settings(ctx: &LogContext, resolved: &ResolvedSettings) {
    let snapshot = resolved.snapshot();
    match &snapshot.path {
        Some(path) => log_event!(
            ctx,
            INFO,
            event_names::CONFIG_LOADED,
            Stage::Init,
            "settings loaded",
            path = path.as_str(),
            source = snapshot.source.as_str(),
            config_id = snapshot.short_id()
        ),
        None => log_event!(
            ctx,
            DEBUG,
            event_names::CONFIG_DEFAULT_USED,
            Stage::Init,
            "using built-in settings"
        ),
    }
    for warning in lint_settings(&resolved.settings) {
        log_event!(
            ctx,
            WARN,
            event_names::CONFIG_WARNING,
            Stage::Init,
            warning.as_str()
        );
    }
}

fn run_analyze(global: &GlobalOpts, args: &AnalyzeArgs) -> ExitCode {
    let ctx = LogContext::new(generate_run_id());
    let input_path = args.input.display().to_string();
    let out_path = args.out.display().to_string();

    log_event!(
        ctx,
        INFO,
        event_names::RUN_STARTED,
        Stage::Init,
        "starting analysis",
        input = input_path.as_str(),
        out = out_path.as_str()
    );

    let resolved = match load_settings(&settings_options(global, Some(args))) {
        Ok(resolved) => resolved,
        Err(e) => return output_config_error(global, &ctx, &e),
    };
    log_settings(&ctx, &resolved);

    let source = match JsonlSource::open(&args.input) {
        Ok(source) => source,
        Err(e) => return output_error(global, &ctx, &e),
    };

    let emitter = progress_emitter(global);
    let options = AnalyzeOptions::new(
        absolute_label(&args.input),
        resolved.settings.clone(),
        args.now.unwrap_or_else(Utc::now),
    )
    .with_limit(args.limit)
    .with_progress(Some(Arc::clone(&emitter)));

    let outcome = match analyze(source, &options, &ctx) {
        Ok(outcome) => outcome,
        Err(e) => return output_error(global, &ctx, &e),
    };

    if let Err(e) = write_report(&args.out, &outcome.report) {
        return output_error(global, &ctx, &e);
    }

    log_event!(
        ctx,
        INFO,
        event_names::REPORT_WRITTEN,
        Stage::Write,
        "report written",
        path = out_path.as_str()
    );
    if global.format.is_machine() {
        emitter.emit(
            ProgressEvent::new(progress_events::REPORT_WRITTEN, Phase::Write).with_position(
                outcome.stats.keys,
                outcome.stats.bytes_consumed,
                None,
            ),
        );
    }

    let stats = outcome.stats;
    let (exit_code, status) = if stats.partial {
        (ExitCode::Partial, "partial")
    } else {
        (ExitCode::Clean, "complete")
    };

    let response = serde_json::json!({
        "schema_version": REPORT_SCHEMA_VERSION,
        "run_id": ctx.run_id,
        "status": status,
        "report": out_path,
        "keys": stats.keys,
        "skipped": stats.skipped,
        "bytes_read": stats.bytes_consumed,
        "settings": resolved.snapshot(),
    });

    match global.format {
        OutputFormat::Json => print_json_pretty(&response),
        OutputFormat::Jsonl => println!("{}", response),
        OutputFormat::Summary => println!("{}", render_summary_line(&outcome.report)),
        OutputFormat::Md => {
            println!("# rdbviz analyze");
            println!();
            println!("Report: {}", out_path);
            println!("{}", render_summary_line(&outcome.report));
            if stats.skipped > 0 {
                println!("Skipped records with empty keys: {}", stats.skipped);
            }
            println!(
                "Settings: separator={:?} depth={} topn={} progress={}",
                resolved.settings.prefix.separator,
                resolved.settings.prefix.max_depth,
                resolved.settings.top_n,
                format_duration(resolved.settings.progress_interval())
            );
            println!("Run: {}", ctx.run_id);
        }
    }

    log_event!(
        ctx,
        INFO,
        event_names::RUN_FINISHED,
        Stage::Write,
        "analysis finished",
        exit_code = exit_code.as_i32()
    );

    exit_code
}

fn absolute_label(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

fn run_summarize(global: &GlobalOpts, args: &SummarizeArgs) -> ExitCode {
    let ctx = LogContext::new(generate_run_id());

    let content = match std::fs::read_to_string(&args.report) {
        Ok(content) => content,
        Err(e) => {
            let err = Error::InputOpen {
                path: args.report.clone(),
                source: e,
            };
            return output_error(global, &ctx, &err);
        }
    };
    let report = match Report::from_json(&content) {
        Ok(report) => report,
        Err(e) => return output_error(global, &ctx, &e),
    };

    log_event!(
        ctx,
        DEBUG,
        event_names::REPORT_ASSEMBLED,
        Stage::Summarize,
        "report loaded",
        keys = report.summary.total_keys
    );

    match global.format {
        OutputFormat::Json => match report.to_json_pretty() {
            Ok(json) => print!("{}", json),
            Err(e) => return output_error(global, &ctx, &e),
        },
        OutputFormat::Jsonl => match serde_json::to_string(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => return output_error(global, &ctx, &Error::Json(e)),
        },
        OutputFormat::Summary => println!("{}", render_summary_line(&report)),
        OutputFormat::Md => print!("{}", render_markdown(&report)),
    }

    ExitCode::Clean
}

fn run_schema(global: &GlobalOpts, args: &SchemaArgs) -> ExitCode {
    if args.list {
        let schemas = available_schemas();
        if global.format.is_machine() {
            let list: Vec<_> = schemas
                .iter()
                .map(|(name, desc)| serde_json::json!({ "name": name, "description": desc }))
                .collect();
            print_json_pretty(&serde_json::Value::Array(list));
        } else {
            for (name, desc) in schemas {
                println!("{:<18} {}", name, desc);
            }
        }
        return ExitCode::Clean;
    }

    let format = if args.compact {
        SchemaFormat::JsonCompact
    } else {
        SchemaFormat::Json
    };

    let schema = if args.all {
        match serde_json::to_value(generate_all_schemas()) {
            Ok(value) => value,
            Err(e) => {
                let ctx = LogContext::new(generate_run_id());
                return output_error(global, &ctx, &Error::Json(e));
            }
        }
    } else {
        let name = args.name.as_deref().unwrap_or("Report");
        match generate_schema(name) {
            Some(schema) => schema,
            None => {
                eprintln!(
                    "unknown schema type '{}'; run `rdbviz schema --list` for available types",
                    name
                );
                return ExitCode::ArgsError;
            }
        }
    };

    match format_schema(&schema, format) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::Clean
        }
        Err(e) => {
            let ctx = LogContext::new(generate_run_id());
            output_error(global, &ctx, &Error::Json(e))
        }
    }
}

fn run_config(global: &GlobalOpts, args: &ConfigArgs) -> ExitCode {
    match &args.command {
        ConfigCommands::Show => run_config_show(global),
        ConfigCommands::Validate => run_config_validate(global),
    }
}

/// Display the effective settings (including defaults if no file is present).
fn run_config_show(global: &GlobalOpts) -> ExitCode {
    let ctx = LogContext::new(generate_run_id());
    let resolved = match load_settings(&settings_options(global, None)) {
        Ok(resolved) => resolved,
        Err(e) => return output_config_error(global, &ctx, &e),
    };
    let snapshot = resolved.snapshot();

    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => print_json_pretty(&snapshot),
        OutputFormat::Summary => println!(
            "[{}] settings: source={} config={}",
            ctx.run_id,
            snapshot.source,
            snapshot.short_id()
        ),
        OutputFormat::Md => {
            let settings = &resolved.settings;
            println!("# rdbviz config show");
            println!();
            match &snapshot.path {
                Some(path) => {
                    println!("Source: {} ({})", path, snapshot.source);
                    println!("Hash: {}", snapshot.content_hash.as_deref().unwrap_or("n/a"));
                }
                None => println!("Source: **built-in defaults** (no rdbviz.json found)"),
            }
            println!();
            println!("| Setting | Value |");
            println!("|---|---|");
            println!("| prefix.separator | {:?} |", settings.prefix.separator);
            println!("| prefix.max_depth | {} |", settings.prefix.max_depth);
            println!("| top_n | {} |", settings.top_n);
            println!(
                "| progress_interval | {} |",
                format_duration(settings.progress_interval())
            );
        }
    }

    ExitCode::Clean
}

/// Validate the settings file.
fn run_config_validate(global: &GlobalOpts) -> ExitCode {
    let ctx = LogContext::new(generate_run_id());
    let resolved = match load_settings(&settings_options(global, None)) {
        Ok(resolved) => resolved,
        Err(e) => return output_config_error(global, &ctx, &e),
    };
    let warnings = lint_settings(&resolved.settings);
    let path = resolved.path.as_ref().map(|p| p.display().to_string());

    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => print_json_pretty(&serde_json::json!({
            "status": "valid",
            "path": path,
            "using_defaults": path.is_none(),
            "warnings": warnings,
        })),
        OutputFormat::Summary => println!(
            "[{}] config validate: OK ({} warning(s))",
            ctx.run_id,
            warnings.len()
        ),
        OutputFormat::Md => {
            println!("# Settings Validation");
            println!();
            println!("Status: ✓ Valid");
            match &path {
                Some(path) => println!("File: {}", path),
                None => println!("File: using built-in defaults"),
            }
            for warning in &warnings {
                println!("Warning: {}", warning);
            }
        }
    }

    ExitCode::Clean
}

fn print_version(global: &GlobalOpts) {
    let version_info = serde_json::json!({
        "rdbviz_version": env!("CARGO_PKG_VERSION"),
        "report_schema_version": REPORT_SCHEMA_VERSION,
    });

    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => print_json_pretty(&version_info),
        _ => {
            println!("rdbviz {}", env!("CARGO_PKG_VERSION"));
            println!("report schema version: {}", REPORT_SCHEMA_VERSION);
        }
    }
}

// ============================================================================
// Output helpers
// ============================================================================

fn print_json_pretty<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to serialize output: {}", e),
    }
}

fn output_error(global: &GlobalOpts, ctx: &LogContext, error: &Error) -> ExitCode {
    let exit_code = ExitCode::from(error);
    log_event!(
        ctx,
        ERROR,
        event_names::RUN_FAILED,
        Stage::Init,
        "run failed",
        code = error.code(),
        exit_code = exit_code.as_i32()
    );

    if global.format.is_machine() {
        eprintln!("{}", StructuredError::from(error).to_json());
    } else {
        let use_color = !global.no_color && std::io::stderr().is_terminal();
        eprintln!("{}", format_error_human(error, use_color));
    }
    exit_code
}

fn output_config_error(global: &GlobalOpts, ctx: &LogContext, error: &ConfigError) -> ExitCode {
    let err = match error {
        ConfigError::ValidationError(ValidationError::InvalidValue { field, message }) => {
            Error::InvalidSetting {
                field: field.clone(),
                message: message.clone(),
            }
        }
        other => Error::Config(other.to_string()),
    };
    output_error(global, ctx, &err);
    ExitCode::from(error)
}
