// In-process task execution
//
// Calls a task entry point living in this process with a process-style argv.
// Panics inside the entry point are caught and reported as structured errors.

use crate::application::dispatcher::panic_guard::{execute_guarded, PanicGuardResult};
use crate::domain::RunSpec;
use crate::port::{ExecutionError, ExecutionResult, ExecutionStatus, TaskExecutor, TimeProvider};
use async_trait::async_trait;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};

/// Entry point signature: full argv in, exit status out.
///
/// `Ok(0)` is a normal return, `Ok(code)` an exit with a status code,
/// `Err(_)` a structured failure. A panic counts as an unstructured failure.
pub type TaskEntryPoint = dyn Fn(&[String]) -> Result<i32, ExecutionError> + Send + Sync;

/// TaskExecutor adapter around an in-process entry point
pub struct InProcessExecutor {
    entry: Arc<TaskEntryPoint>,
    time_provider: Arc<dyn TimeProvider>,
}

impl InProcessExecutor {
    pub fn new<F>(entry: F, time_provider: Arc<dyn TimeProvider>) -> Self
    where
        F: Fn(&[String]) -> Result<i32, ExecutionError> + Send + Sync + 'static,
    {
        Self {
            entry: Arc::new(entry),
            time_provider,
        }
    }
}

#[async_trait]
impl TaskExecutor for InProcessExecutor {
    async fn execute(&self, spec: &RunSpec) -> Result<ExecutionResult, ExecutionError> {
        let start_time = self.time_provider.now_millis();
        let argv = spec.argv();

        // Blocking call; runs are sequential so nothing else waits on this thread
        let outcome = execute_guarded(AssertUnwindSafe(|| (self.entry)(argv)));
        let duration_ms = self.time_provider.now_millis() - start_time;

        match outcome {
            PanicGuardResult::Success(Ok(code)) => {
                let status = if code == 0 {
                    ExecutionStatus::Success
                } else {
                    ExecutionStatus::Failed
                };
                debug!(index = %spec.index, exit_code = code, duration_ms, "In-process task returned");
                Ok(ExecutionResult {
                    status,
                    duration_ms,
                    exit_code: Some(code),
                    stdout: None,
                    stderr: None,
                })
            }
            PanicGuardResult::Success(Err(e)) => {
                warn!(index = %spec.index, error = %e, "In-process task reported an error");
                Err(e)
            }
            PanicGuardResult::Panicked(msg) => Err(ExecutionError::Panicked(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ArgumentTemplate, RunIndex};
    use crate::port::time_provider::mocks::SteppingTimeProvider;
    use std::sync::Mutex;

    fn spec() -> RunSpec {
        let template = ArgumentTemplate::from_argv(["vina", "--cpu", "1"]);
        RunSpec::derive(&template, RunIndex::new(5), "r.pdbqt", "l.pdbqt", "out")
    }

    fn executor<F>(entry: F) -> InProcessExecutor
    where
        F: Fn(&[String]) -> Result<i32, ExecutionError> + Send + Sync + 'static,
    {
        InProcessExecutor::new(entry, Arc::new(SteppingTimeProvider::new(0, 10)))
    }

    #[tokio::test]
    async fn test_entry_receives_full_argv() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_entry = Arc::clone(&seen);
        let executor = executor(move |argv| {
            *seen_in_entry.lock().unwrap() = argv.to_vec();
            Ok(0)
        });

        let result = executor.execute(&spec()).await.unwrap();

        assert!(result.is_success());
        assert_eq!(result.duration_ms, 10);
        assert_eq!(seen.lock().unwrap().as_slice(), spec().argv());
    }

    #[tokio::test]
    async fn test_nonzero_status_is_failed() {
        let result = executor(|_| Ok(2)).execute(&spec()).await.unwrap();

        assert_eq!(result.status, ExecutionStatus::Failed);
        assert_eq!(result.exit_code, Some(2));
    }

    #[tokio::test]
    async fn test_structured_error_propagates() {
        let result = executor(|_| Err(ExecutionError::Task("bad grid".into())))
            .execute(&spec())
            .await;

        assert_eq!(result.unwrap_err(), ExecutionError::Task("bad grid".into()));
    }

    #[test]
    fn test_panic_becomes_error() {
        let executor = executor(|_| panic!("vina aborted"));

        let result = tokio_test::block_on(executor.execute(&spec()));

        assert_eq!(
            result.unwrap_err(),
            ExecutionError::Panicked("vina aborted".into())
        );
    }
}
