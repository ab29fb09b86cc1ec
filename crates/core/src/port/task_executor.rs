// Task Executor Port
// Abstraction for invoking the external docking task (subprocess or in-process)

use crate::domain::RunSpec;
use async_trait::async_trait;
use thiserror::Error;

/// Result of a task invocation that ran to completion
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub duration_ms: i64,
    pub exit_code: Option<i32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

/// Execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Returned normally
    Success,
    /// Exited with a non-zero status code
    Failed,
    /// Terminated by a signal, no exit code
    Killed,
}

/// Execution errors (the task never reached a normal exit)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Task error: {0}")]
    Task(String),

    #[error("Task panicked: {0}")]
    Panicked(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Task Executor trait
///
/// Implementations:
/// - SubprocessExecutor (infra-system): spawns the external program per run
/// - InProcessExecutor: calls an entry point in the current process
///
/// Implementations are invoked strictly one run at a time.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Invoke the task with the run's argv
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the task cannot be started
    /// - ExecutionError::Task if the task reports a structured error
    /// - ExecutionError::Panicked if an in-process task panics
    async fn execute(&self, spec: &RunSpec) -> Result<ExecutionResult, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::RunIndex;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Mock executor behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Write the expected artifact and return normally
        WriteArtifact,
        /// Return normally without writing anything
        NoOp,
        /// Exit with the given status code, writing nothing
        ExitCode(i32),
        /// Write a partial artifact, then exit with the given status code
        PartialThenExit(i32),
        /// Return a structured error
        Fail(String),
        /// Panic with message (for panic isolation testing)
        Panic(String),
    }

    /// Mock Task Executor for testing
    ///
    /// Artifacts are written into `work_dir` under the run's output name.
    pub struct MockTaskExecutor {
        work_dir: PathBuf,
        default_behavior: MockBehavior,
        overrides: HashMap<RunIndex, MockBehavior>,
        calls: Mutex<Vec<RunSpec>>,
    }

    impl MockTaskExecutor {
        pub fn new(work_dir: impl Into<PathBuf>, behavior: MockBehavior) -> Self {
            Self {
                work_dir: work_dir.into(),
                default_behavior: behavior,
                overrides: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn new_success(work_dir: impl Into<PathBuf>) -> Self {
            Self::new(work_dir, MockBehavior::WriteArtifact)
        }

        /// Use a different behavior for one run
        pub fn with_behavior_at(mut self, index: u64, behavior: MockBehavior) -> Self {
            self.overrides.insert(RunIndex::new(index), behavior);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// Every RunSpec received, in call order
        pub fn calls(&self) -> Vec<RunSpec> {
            self.calls.lock().unwrap().clone()
        }

        fn write_artifact(&self, spec: &RunSpec, contents: &str) -> Result<(), ExecutionError> {
            std::fs::write(self.work_dir.join(&spec.output_name), contents)
                .map_err(|e| ExecutionError::IoError(e.to_string()))
        }

        fn finished(status: ExecutionStatus, exit_code: i32) -> ExecutionResult {
            ExecutionResult {
                status,
                duration_ms: 1,
                exit_code: Some(exit_code),
                stdout: Some("mock output".to_string()),
                stderr: None,
            }
        }
    }

    #[async_trait]
    impl TaskExecutor for MockTaskExecutor {
        async fn execute(&self, spec: &RunSpec) -> Result<ExecutionResult, ExecutionError> {
            self.calls.lock().unwrap().push(spec.clone());

            let behavior = self
                .overrides
                .get(&spec.index)
                .unwrap_or(&self.default_behavior)
                .clone();

            match behavior {
                MockBehavior::WriteArtifact => {
                    self.write_artifact(spec, "MODEL 1\nENDMDL\n")?;
                    Ok(Self::finished(ExecutionStatus::Success, 0))
                }
                MockBehavior::NoOp => Ok(Self::finished(ExecutionStatus::Success, 0)),
                MockBehavior::ExitCode(code) => Ok(Self::finished(ExecutionStatus::Failed, code)),
                MockBehavior::PartialThenExit(code) => {
                    self.write_artifact(spec, "MODEL 1\n")?;
                    Ok(Self::finished(ExecutionStatus::Failed, code))
                }
                MockBehavior::Fail(msg) => Err(ExecutionError::Task(msg)),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
            }
        }
    }
}
