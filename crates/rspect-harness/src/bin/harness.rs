//! CLI entrypoint for the rspect harness.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use rspect_core::TestModule;
use rspect_harness::structured_log::{LogEmitter, validate_log_file};
use rspect_harness::{EmptyReporter, HarnessConfig, LogReporter, RunSummary, SmokeModule, TestContext};

/// Test runner tooling for rspect modules.
#[derive(Debug, Parser)]
#[command(name = "rspect-harness")]
#[command(about = "Runner and log tooling for rspect test modules")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the built-in smoke module.
    SelfCheck {
        /// Structured JSONL run log (overrides RSPECT_LOG).
        #[arg(long)]
        log: Option<PathBuf>,
        /// Write the run summary as JSON.
        #[arg(long)]
        summary: Option<PathBuf>,
    },
    /// Validate a structured run log.
    ValidateLog {
        #[arg(long)]
        log: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::SelfCheck { log, summary } => {
            let config = match &cli.config {
                Some(path) => {
                    HarnessConfig::from_file(path)?.apply_overrides(|key| std::env::var(key).ok())
                }
                None => HarnessConfig::from_env(),
            };
            let log_path = log.or_else(|| config.log_path.clone());

            let module = SmokeModule;
            let result = run_module(&module, config, log_path)?;
            eprintln!(
                "{}: {} tests, {} passed, {} failed, {} skipped, {} todo",
                result.module, result.total, result.passed, result.failed, result.skipped, result.todos
            );
            for (group, test) in result.failures() {
                eprintln!(
                    "FAIL {group} / {}: {}",
                    test.name,
                    test.message.as_deref().unwrap_or("")
                );
            }
            if let Some(path) = summary {
                std::fs::write(&path, result.to_json()?)?;
                eprintln!("Summary written to {}", path.display());
            }
            if !result.all_passed() {
                return Err(format!("{} failed", result.module).into());
            }
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            for error in &errors {
                eprintln!("{error}");
            }
            if !errors.is_empty() {
                return Err(format!("{} invalid entries in {} lines", errors.len(), lines).into());
            }
            eprintln!("{}: {lines} valid lines", log.display());
        }
    }

    Ok(())
}

fn run_module(
    module: &dyn TestModule,
    config: HarnessConfig,
    log_path: Option<PathBuf>,
) -> Result<RunSummary, Box<dyn std::error::Error>> {
    let mut context = TestContext::new(config);
    match log_path {
        Some(path) => {
            let emitter = LogEmitter::to_file(&path, module.name(), &run_id())?;
            let mut reporter = LogReporter::new(emitter);
            let summary = context.run(module, &mut reporter)?;
            reporter.finish()?;
            eprintln!("Run log written to {}", path.display());
            Ok(summary)
        }
        None => Ok(context.run(module, &mut EmptyReporter)?),
    }
}

fn run_id() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("run-{secs}")
}
