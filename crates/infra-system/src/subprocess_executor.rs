// Subprocess executor: runs the external docking program once per pair
// reason: async-trait, tokio for async process management
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info, warn};

use dockbatch_core::domain::RunSpec;
use dockbatch_core::port::task_executor::{
    ExecutionError, ExecutionResult, ExecutionStatus, TaskExecutor,
};
use dockbatch_core::port::TimeProvider;

/// Where the child's stdout/stderr go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Share the driver's streams, so task output interleaves with status lines
    #[default]
    Inherit,
    /// Capture into ExecutionResult::stdout / stderr
    Capture,
}

/// Subprocess executor
/// Spawns the task program with the run's arguments inside the batch working directory
pub struct SubprocessExecutor {
    program: PathBuf,
    work_dir: PathBuf,
    output_mode: OutputMode,
    time_provider: Arc<dyn TimeProvider>,
}

impl SubprocessExecutor {
    /// Create a new subprocess executor
    ///
    /// # Arguments
    /// * `program` - Task executable (e.g. `vina`, `smina`)
    /// * `work_dir` - Directory the task runs in; output names resolve against it
    /// * `time_provider` - Time provider for duration tracking
    ///
    /// # Example
    /// ```ignore
    /// let executor = SubprocessExecutor::new(
    ///     "/usr/local/bin/smina",
    ///     std::env::current_dir()?,
    ///     Arc::new(SystemTimeProvider),
    /// );
    /// ```
    pub fn new(
        program: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            program: program.into(),
            work_dir: work_dir.into(),
            output_mode: OutputMode::default(),
            time_provider,
        }
    }

    pub fn with_output_mode(mut self, output_mode: OutputMode) -> Self {
        self.output_mode = output_mode;
        self
    }

    fn command(&self, spec: &RunSpec) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(spec.args())
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        match self.output_mode {
            OutputMode::Inherit => {
                command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
            OutputMode::Capture => {
                command.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
        }
        command
    }

    /// Spawn child process and wait for it to exit
    async fn spawn_and_wait(
        &self,
        spec: &RunSpec,
    ) -> Result<(ExitStatus, Option<String>, Option<String>), ExecutionError> {
        let mut child = self
            .command(spec)
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(format!("{}: {}", self.program.display(), e)))?;

        match self.output_mode {
            OutputMode::Inherit => {
                let status = child
                    .wait()
                    .await
                    .map_err(|e| ExecutionError::IoError(e.to_string()))?;
                Ok((status, None, None))
            }
            OutputMode::Capture => {
                let output = child
                    .wait_with_output()
                    .await
                    .map_err(|e| ExecutionError::IoError(e.to_string()))?;
                Ok((
                    output.status,
                    Some(String::from_utf8_lossy(&output.stdout).to_string()),
                    Some(String::from_utf8_lossy(&output.stderr).to_string()),
                ))
            }
        }
    }

    /// Build execution result from the exit status
    fn build_result(
        &self,
        spec: &RunSpec,
        status: ExitStatus,
        stdout: Option<String>,
        stderr: Option<String>,
        duration_ms: i64,
    ) -> ExecutionResult {
        let execution_status = if status.success() {
            ExecutionStatus::Success
        } else if status.code().is_some() {
            ExecutionStatus::Failed
        } else {
            ExecutionStatus::Killed
        };

        if execution_status == ExecutionStatus::Killed {
            warn!(index = %spec.index, signal = ?terminating_signal(&status), "Task terminated by signal");
        }

        ExecutionResult {
            status: execution_status,
            exit_code: status.code(),
            duration_ms,
            stdout,
            stderr,
        }
    }
}

#[cfg(unix)]
fn terminating_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminating_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

#[async_trait]
impl TaskExecutor for SubprocessExecutor {
    async fn execute(&self, spec: &RunSpec) -> Result<ExecutionResult, ExecutionError> {
        let start_time = self.time_provider.now_millis();

        info!(
            program = %self.program.display(),
            args = ?spec.args(),
            working_dir = %self.work_dir.display(),
            "Starting subprocess execution"
        );

        let (status, stdout, stderr) = self.spawn_and_wait(spec).await?;

        let duration_ms = self.time_provider.now_millis() - start_time;
        let result = self.build_result(spec, status, stdout, stderr, duration_ms);

        debug!(
            index = %spec.index,
            duration_ms = %duration_ms,
            exit_code = ?result.exit_code,
            status = ?result.status,
            "Subprocess execution completed"
        );

        Ok(result)
    }
}
