// Panic isolation: one run's panic must not end the batch
use std::any::Any;
use std::panic::catch_unwind;
use tracing::error;

/// Result of a panic-guarded execution
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    /// Execution completed successfully
    Success(T),
    /// Execution panicked
    Panicked(String),
}

/// Execute a closure with panic isolation
///
/// If the closure panics, the panic is caught and returned as PanicGuardResult::Panicked.
///
/// # Example
/// ```text
/// let result = execute_guarded(|| {
///     // This panic will be caught
///     panic!("test panic");
/// });
///
/// match result {
///     PanicGuardResult::Panicked(msg) => {
///         println!("Caught panic: {}", msg);
///     }
///     _ => {}
/// }
/// ```
pub fn execute_guarded<F, T>(f: F) -> PanicGuardResult<T>
where
    F: FnOnce() -> T + std::panic::UnwindSafe,
{
    match catch_unwind(f) {
        Ok(result) => PanicGuardResult::Success(result),
        Err(payload) => {
            let panic_msg = panic_message(payload.as_ref());
            error!(panic_msg = %panic_msg, "Task panicked");
            PanicGuardResult::Panicked(panic_msg)
        }
    }
}

/// Readable message from a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_passes_value_through() {
        match execute_guarded(|| 42) {
            PanicGuardResult::Success(v) => assert_eq!(v, 42),
            PanicGuardResult::Panicked(msg) => panic!("unexpected panic: {}", msg),
        }
    }

    #[test]
    fn test_str_panic_is_caught() {
        let result: PanicGuardResult<()> = execute_guarded(|| panic!("boom"));
        assert!(matches!(result, PanicGuardResult::Panicked(ref m) if m == "boom"));
    }

    #[test]
    fn test_formatted_panic_is_caught() {
        let code = 3;
        let result: PanicGuardResult<()> = execute_guarded(move || panic!("exit {}", code));
        assert!(matches!(result, PanicGuardResult::Panicked(ref m) if m == "exit 3"));
    }

    #[test]
    fn test_non_string_payload() {
        let result: PanicGuardResult<()> = execute_guarded(|| std::panic::panic_any(17_i32));
        assert!(matches!(result, PanicGuardResult::Panicked(ref m) if m == "Unknown panic"));
    }
}
