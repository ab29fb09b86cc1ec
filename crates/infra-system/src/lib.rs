// Dockbatch Infrastructure - System Adapters
// Implements: TaskExecutor over a child process

pub mod subprocess_executor;

pub use subprocess_executor::{OutputMode, SubprocessExecutor};
