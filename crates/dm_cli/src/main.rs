// crates/dm_cli/src/main.rs
//
// Wires up: exit codes, typed error mapping, CLI parsing, the
// validate-only short-circuit, and the full run path
// (load → pipeline → report to file or stdout).

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const IO: i32 = 4;
}

use std::process::ExitCode;

use args::{parse_and_validate as parse_cli, Args, CliError};

use dm_io::request;
use dm_pipeline::PipelineError;
use tracing_subscriber::EnvFilter;

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Request shape/domain validation failures (incl. allocation domain errors)
    Validation(String),
    /// I/O errors (read/write/path)
    Io(String),
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("dm: error: {e}");
            let rc = match e {
                CliError::NonLocalPath(_) => exitcodes::VALIDATION,
                CliError::NotFound(_) => exitcodes::IO,
            };
            return ExitCode::from(rc as u8);
        }
    };

    init_tracing(&args);

    let rc = if args.validate_only {
        match validate_only(&args) {
            Ok(()) => exitcodes::OK,
            Err(e) => report_and_map(&e),
        }
    } else {
        match run_once(&args) {
            Ok(()) => exitcodes::OK,
            Err(e) => report_and_map(&e),
        }
    };

    ExitCode::from(rc as u8)
}

/// Stderr logging; RUST_LOG overrides, --quiet wins.
fn init_tracing(args: &Args) {
    let default_level = if args.quiet { "error" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Validate-only path (no allocation, no artifacts).
fn validate_only(args: &Args) -> Result<(), MainError> {
    let req = request::load_request_from_path(&args.input).map_err(map_io_err)?;
    let config = args.engine_config();
    let report = dm_pipeline::validate::validate(&req, &config.cost_metrics);
    if report.pass {
        if !args.quiet {
            eprintln!("validate-only: request OK ({} agents)", req.agents.len());
        }
        Ok(())
    } else {
        let mut lines = String::new();
        for issue in &report.issues {
            lines.push_str(&format!("[{}] {}\n", issue.code, issue.message));
        }
        Err(MainError::Validation(lines))
    }
}

/// Full run: load, allocate, emit the report.
fn run_once(args: &Args) -> Result<(), MainError> {
    let config = args.engine_config();
    // Load here rather than via run_from_request_path so JSON shape errors
    // map to the validation exit code, not the I/O one.
    let req = request::load_request_from_path(&args.input).map_err(map_io_err)?;
    let outputs = dm_pipeline::run_with_request(&req, &config).map_err(map_pipeline_err)?;
    let report = dm_pipeline::build_report(&outputs);

    match &args.out {
        Some(path) => {
            dm_io::report::write_report_to_path(&report, path).map_err(map_io_err)?;
            if !args.quiet {
                eprintln!("report written to {}", path.display());
            }
        }
        None => {
            let text = dm_io::report::report_to_string(&report).map_err(map_io_err)?;
            println!("{text}");
        }
    }
    Ok(())
}

fn report_and_map(e: &MainError) -> i32 {
    match e {
        MainError::Validation(m) => {
            eprintln!("dm: validation error:\n{m}");
            exitcodes::VALIDATION
        }
        MainError::Io(m) => {
            eprintln!("dm: io error: {m}");
            exitcodes::IO
        }
    }
}

/// Translate dm_io::IoError into MainError buckets for exit-code mapping.
fn map_io_err(e: dm_io::IoError) -> MainError {
    use dm_io::IoError::*;
    match e {
        Json { pointer, msg } => MainError::Validation(format!("json {pointer}: {msg}")),
        Invalid(m) => MainError::Validation(m),
        Path(m) => MainError::Io(m),
    }
}

/// Translate dm_pipeline::PipelineError into MainError buckets.
fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Io(m) => MainError::Io(m),
        PipelineError::Validate(report) => {
            let mut lines = String::new();
            for issue in &report.issues {
                lines.push_str(&format!("[{}] {}\n", issue.code, issue.message));
            }
            MainError::Validation(lines)
        }
        PipelineError::Schema(m) | PipelineError::Allocate(m) => MainError::Validation(m),
    }
}
