//! Dockbatch - Batch Driver Entry Point
//!
//! Runs the docking program once for every (receptor, ligand) pair listed in
//! `receptor_list.txt` x `ligand_list.txt`. The driver's own arguments are the
//! baseline for every run; `--receptor`, `--ligand` and `--out` are set per pair.
//! Failed runs are announced on stdout as `ERROR RUN: {index}`.

mod config;

use anyhow::{anyhow, bail, Context, Result};
use std::ffi::OsString;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::DriverConfig;
use dockbatch_core::application::{BatchDispatcher, BatchReport};
use dockbatch_core::domain::ArgumentTemplate;
use dockbatch_core::port::time_provider::SystemTimeProvider;
use dockbatch_core::port::StdoutStatusSink;
use dockbatch_infra_system::SubprocessExecutor;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_LOG_FILTER: &str = "dockbatch=info,dockbatch_core=info,dockbatch_infra_system=info";

// Runs are sequential; a single-threaded runtime is all the batch needs
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize logging (stderr only: stdout carries the status lines)
    init_logging()?;

    info!("Dockbatch v{} starting...", VERSION);

    // 2. Load configuration; argv is captured once and passed down as a value
    let config = DriverConfig::from_env()?;
    let template = ArgumentTemplate::from_argv(collect_argv(std::env::args_os())?);

    info!(
        task = %config.task_program.display(),
        work_dir = %config.work_dir.display(),
        pass_through = ?template.args(),
        "Configuration loaded"
    );

    // 3. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let task_executor = Arc::new(SubprocessExecutor::new(
        config.task_program.clone(),
        config.work_dir.clone(),
        time_provider.clone(),
    ));
    let dispatcher = BatchDispatcher::new(
        config.dispatcher_config(),
        task_executor,
        Arc::new(StdoutStatusSink),
        time_provider,
    );

    // 4. Dispatch every pair (an unreadable list aborts here, before any run)
    let report = dispatcher
        .run(&template, &config.receptor_list, &config.ligand_list)
        .await?;

    // 5. Report
    if let Some(path) = &config.report_path {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "Batch report written");
    }

    info!(
        total_runs = report.total_runs(),
        failed_runs = report.failure_count(),
        "Batch complete"
    );

    exit_policy(&report, config.strict_exit)
}

/// Pass-through arguments must survive unchanged, so non-UTF-8 is rejected
fn collect_argv<I>(args: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .enumerate()
        .map(|(position, arg)| {
            arg.into_string()
                .map_err(|raw| anyhow!("Argument {} is not valid UTF-8: {:?}", position, raw))
        })
        .collect()
}

/// A completed batch exits 0 unless strict exit is on and some run failed
fn exit_policy(report: &BatchReport, strict_exit: bool) -> Result<()> {
    if strict_exit && report.has_failures() {
        bail!(
            "{} of {} runs failed",
            report.failure_count(),
            report.total_runs()
        );
    }
    Ok(())
}

fn init_logging() -> Result<()> {
    let log_format =
        std::env::var("DOCKBATCH_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => {
            // Machine-readable structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
