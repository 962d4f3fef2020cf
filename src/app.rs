//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the real main:
//! - initialises logging and loads `.env`
//! - parses CLI arguments
//! - runs the fetch or chart pipeline
//! - prints the summary and writes the outputs

use std::fs;
use std::io::Write;

use clap::Parser;
use log::info;

use crate::cli::{ChartArgs, Command, FetchArgs, WindowArgs};
use crate::data::{HttpTransport, SourceKind};
use crate::domain::DateWindow;
use crate::error::AppError;
use crate::io::write_aligned_csv;
use crate::plot::write_html;
use crate::series::AlignedFrame;

pub mod pipeline;
pub mod presets;

/// Entry point for the `sai` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();
    // A missing .env file is fine; keys may come from the real environment.
    dotenvy::dotenv().ok();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fetch(args) => handle_fetch(args),
        Command::Chart(args) => handle_chart(args),
    }
}

/// Report a failed run on `out` (stdout in `main`) and return the process exit code.
pub fn exit_code(result: Result<(), AppError>, out: &mut impl Write) -> u8 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            // Nothing more to do if stdout itself is gone.
            let _ = writeln!(out, "Error: {err}");
            err.exit_code()
        }
    }
}

/// `info` unless `RUST_LOG` says otherwise; everything goes to stdout.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .format_target(false)
        .init();
}

fn window_from_args(args: &WindowArgs) -> Result<DateWindow, AppError> {
    Ok(DateWindow::new(args.start, args.end)?)
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let window = window_from_args(&args.window)?;
    let kinds: Vec<SourceKind> = if args.sources.is_empty() {
        SourceKind::ALL.to_vec()
    } else {
        args.sources.clone()
    };

    fs::create_dir_all(&args.out_dir).map_err(|e| {
        AppError::new(
            4,
            format!("Failed to create output directory '{}': {e}", args.out_dir.display()),
        )
    })?;

    let transport = HttpTransport::new(std::time::Duration::from_secs(args.timeout_secs))?;
    let planned = pipeline::plan_fetch(&kinds, &args.out_dir, |var| std::env::var(var).ok());
    let outcomes = pipeline::run_fetch(&transport, planned, &window);

    println!("{}", crate::report::format_fetch_summary(&outcomes));

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if args.strict && failed > 0 {
        return Err(AppError::new(4, format!("{failed} source(s) failed to fetch.")));
    }
    Ok(())
}

fn handle_chart(args: ChartArgs) -> Result<(), AppError> {
    let window = window_from_args(&args.window)?;
    let plan = args.preset.plan(&args.data_dir, &window, args.width, args.height)?;
    let run = pipeline::run_chart(&plan, &window)?;

    write_html(&args.output, &run.html)?;
    info!("Chart written to {}", args.output.display());

    if let Some(path) = &args.export_aligned {
        let frame = AlignedFrame::outer_join(&run.aligned);
        write_aligned_csv(path, &frame)?;
        info!(
            "Aligned data ({} rows, {} complete) written to {}",
            frame.rows.len(),
            frame.complete_rows(),
            path.display()
        );
    }

    println!(
        "{}",
        crate::report::format_chart_summary(&run.loaded, &run.aligned, &args.output)
    );
    Ok(())
}

/// Rewrite argv so `sai` defaults to `sai chart`.
///
/// Rules:
/// - `sai`                      -> `sai chart`
/// - `sai --preset zar-cpi ...` -> `sai chart --preset zar-cpi ...`
/// - `sai --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("chart".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    if matches!(arg1.as_str(), "fetch" | "chart") {
        return argv;
    }

    // Flags without a subcommand belong to `chart`.
    if arg1.starts_with('-') {
        argv.insert(1, "chart".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_chart() {
        assert_eq!(rewrite_args(args(&["sai"])), args(&["sai", "chart"]));
    }

    #[test]
    fn leading_flags_go_to_chart() {
        assert_eq!(
            rewrite_args(args(&["sai", "--preset", "zar-cpi"])),
            args(&["sai", "chart", "--preset", "zar-cpi"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(args(&["sai", "fetch"])), args(&["sai", "fetch"]));
        assert_eq!(rewrite_args(args(&["sai", "--help"])), args(&["sai", "--help"]));
    }

    #[test]
    fn failures_are_written_to_the_output_stream() {
        let mut out = Vec::new();
        let code = exit_code(
            Err(AppError::new(2, "file not found: 'sa_cpi_monthly_yoy.csv'")),
            &mut out,
        );
        assert_eq!(code, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Error: file not found: 'sa_cpi_monthly_yoy.csv'\n"
        );

        let mut out = Vec::new();
        assert_eq!(exit_code(Ok(()), &mut out), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn inverted_window_is_a_config_error() {
        let w = WindowArgs {
            start: chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        assert_eq!(window_from_args(&w).unwrap_err().exit_code(), 2);
    }
}
