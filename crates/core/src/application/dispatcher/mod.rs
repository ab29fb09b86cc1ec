// Batch Dispatcher - one task run per (receptor, ligand) pair

pub mod constants;
pub mod panic_guard;
mod report;

pub use panic_guard::{execute_guarded, PanicGuardResult};
pub use report::{BatchReport, RunRecord};

use crate::application::loader::load_input_list;
use crate::domain::{ArgumentTemplate, InputList, ListKind, RunFailure, RunIndex, RunOutcome, RunSpec};
use crate::error::{BatchError, Result};
use crate::port::{ExecutionError, ExecutionResult, StatusSink, TaskExecutor, TimeProvider};
use constants::DEFAULT_OUT_EXTENSION;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

/// What the spawned task invocation hands back to the loop
type JoinedExecution = std::result::Result<std::result::Result<ExecutionResult, ExecutionError>, JoinError>;

/// Where runs happen and how their artifacts are named
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Directory that holds the output artifacts (the task's working directory)
    pub work_dir: PathBuf,
    /// Extension of synthesized output names
    pub out_extension: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            out_extension: DEFAULT_OUT_EXTENSION.to_string(),
        }
    }
}

/// Drives the cartesian product of two input lists to completion.
///
/// Runs are strictly sequential. A failing run is reported on the status
/// sink and recorded in the BatchReport; it never stops the batch.
pub struct BatchDispatcher {
    config: DispatcherConfig,
    task_executor: Arc<dyn TaskExecutor>,
    status_sink: Arc<dyn StatusSink>,
    time_provider: Arc<dyn TimeProvider>,
}

impl BatchDispatcher {
    pub fn new(
        config: DispatcherConfig,
        task_executor: Arc<dyn TaskExecutor>,
        status_sink: Arc<dyn StatusSink>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            config,
            task_executor,
            status_sink,
            time_provider,
        }
    }

    /// Load both lists, then dispatch every pair.
    ///
    /// # Errors
    /// `BatchError::FileNotReadable` if either list cannot be read. The
    /// status sink gets an `Unable to open` line and no run is attempted.
    pub async fn run(
        &self,
        template: &ArgumentTemplate,
        receptor_list: &Path,
        ligand_list: &Path,
    ) -> Result<BatchReport> {
        let receptors = self.load(ListKind::Receptor, receptor_list)?;
        let ligands = self.load(ListKind::Ligand, ligand_list)?;
        Ok(self.dispatch(template, &receptors, &ligands).await)
    }

    fn load(&self, kind: ListKind, path: &Path) -> Result<InputList> {
        load_input_list(kind, path).inspect_err(|e| {
            if let BatchError::FileNotReadable { path, source } = e {
                error!(kind = %kind, path = %path.display(), error = %source, "Input list not readable");
                self.status_sink.list_unreadable(path);
            }
        })
    }

    /// Dispatch every (receptor, ligand) pair in receptor-major order.
    ///
    /// The index is assigned before the run is built, so a pair's index
    /// depends only on its position, never on how earlier runs ended.
    pub async fn dispatch(
        &self,
        template: &ArgumentTemplate,
        receptors: &InputList,
        ligands: &InputList,
    ) -> BatchReport {
        let started_at_ms = self.time_provider.now_millis();
        let total_runs = receptors.len() * ligands.len();
        info!(
            receptors = receptors.len(),
            ligands = ligands.len(),
            total_runs,
            score_only = template.is_score_only(),
            "Starting batch dispatch"
        );

        let mut runs = Vec::with_capacity(total_runs);
        let mut index = RunIndex::ZERO;
        for receptor in receptors {
            for ligand in ligands {
                let spec = RunSpec::derive(
                    template,
                    index,
                    receptor,
                    ligand,
                    &self.config.out_extension,
                );
                runs.push(self.execute_run(spec).await);
                index = index.next();
            }
        }

        let report = BatchReport {
            started_at_ms,
            finished_at_ms: self.time_provider.now_millis(),
            runs,
        };
        info!(
            total_runs = report.total_runs(),
            failed_runs = report.failure_count(),
            duration_ms = report.duration_ms(),
            "Batch dispatch finished"
        );
        report
    }

    /// Run one pair and classify it; emits the failure line when needed
    async fn execute_run(&self, spec: RunSpec) -> RunRecord {
        info!(
            index = %spec.index,
            receptor = %spec.receptor,
            ligand = %spec.ligand,
            output = %spec.output_name,
            "Dispatching run"
        );

        // Only what this run writes may count as its artifact
        remove_stale_artifact(&self.config.work_dir.join(&spec.output_name));

        // Spawned so that a panicking executor is reported through the
        // JoinHandle instead of unwinding through the batch loop
        let spec = Arc::new(spec);
        let spec_for_exec = Arc::clone(&spec);
        let task_executor = Arc::clone(&self.task_executor);
        let handle =
            tokio::task::spawn(async move { task_executor.execute(&spec_for_exec).await });
        let task_result = Self::interpret(&spec, handle.await);

        let outcome = self.classify(&spec, task_result);
        match &outcome {
            RunOutcome::Success => info!(index = %spec.index, "Run succeeded"),
            RunOutcome::Failure(failure) => {
                error!(index = %spec.index, reason = %failure, "Run failed");
                self.status_sink.run_failed(spec.index);
            }
        }

        let spec = Arc::try_unwrap(spec).unwrap_or_else(|arc| (*arc).clone());
        RunRecord {
            index: spec.index,
            receptor: spec.receptor,
            ligand: spec.ligand,
            output_name: spec.output_name,
            outcome,
        }
    }

    /// Fold the four ways a task can end into "clean" or "abnormal"
    fn interpret(spec: &RunSpec, joined: JoinedExecution) -> std::result::Result<(), RunFailure> {
        match joined {
            Ok(Ok(result)) if result.is_success() => {
                debug!(index = %spec.index, duration_ms = result.duration_ms, "Task returned normally");
                Ok(())
            }
            Ok(Ok(result)) => {
                let reason = match result.exit_code {
                    Some(code) => format!("exited with status {}", code),
                    None => format!("{:?} without exit status", result.status),
                };
                if let Some(stderr) = result.stderr.as_deref().filter(|s| !s.is_empty()) {
                    debug!(index = %spec.index, stderr = %stderr, "Task stderr");
                }
                Err(RunFailure::TaskAbnormalTermination(reason))
            }
            Ok(Err(e)) => Err(RunFailure::TaskAbnormalTermination(e.to_string())),
            Err(join_err) if join_err.is_panic() => {
                let msg = panic_guard::panic_message(join_err.into_panic().as_ref());
                Err(RunFailure::TaskAbnormalTermination(format!("panicked: {}", msg)))
            }
            Err(join_err) => Err(RunFailure::TaskAbnormalTermination(format!(
                "cancelled: {}",
                join_err
            ))),
        }
    }

    /// Decide the outcome from the task result and the artifact on disk
    fn classify(&self, spec: &RunSpec, task_result: std::result::Result<(), RunFailure>) -> RunOutcome {
        let output_path = self.config.work_dir.join(&spec.output_name);

        if spec.is_score_only() {
            // Score-only runs produce no artifact; the placeholder marks the run as attempted
            let placeholder = File::create(&output_path);
            return match (task_result, placeholder) {
                (Err(failure), _) => RunOutcome::Failure(failure),
                (Ok(()), Ok(_)) => RunOutcome::Success,
                (Ok(()), Err(e)) => {
                    warn!(path = %output_path.display(), error = %e, "Failed to write placeholder");
                    RunOutcome::Failure(RunFailure::PlaceholderWrite(e.to_string()))
                }
            };
        }

        match task_result {
            Err(failure) => {
                remove_partial_artifact(&output_path);
                RunOutcome::Failure(failure)
            }
            Ok(()) if artifact_readable(&output_path) => RunOutcome::Success,
            Ok(()) => RunOutcome::Failure(RunFailure::MissingOutputArtifact),
        }
    }
}

/// Output exists, is a regular file and opens for reading
fn artifact_readable(path: &Path) -> bool {
    File::open(path)
        .and_then(|file| file.metadata())
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Drop whatever an aborted run left behind under its output name
fn remove_partial_artifact(path: &Path) {
    if remove_artifact(path) {
        warn!(path = %path.display(), "Removed partial output of failed run");
    }
}

/// Drop a file left under this run's output name by an earlier batch
fn remove_stale_artifact(path: &Path) {
    if remove_artifact(path) {
        warn!(path = %path.display(), "Removed stale output before run");
    }
}

/// Best effort; true when a file was actually removed
fn remove_artifact(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not remove output");
            false
        }
    }
}
