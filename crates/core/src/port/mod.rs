// Port Layer - Interfaces for external dependencies

pub mod status_sink;
pub mod task_executor;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use status_sink::{StatusSink, StdoutStatusSink};
pub use task_executor::{ExecutionError, ExecutionResult, ExecutionStatus, TaskExecutor};
pub use time_provider::TimeProvider;
