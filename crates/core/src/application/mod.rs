// Application Layer - Use Cases: load lists, dispatch the pair batch

pub mod dispatcher;
pub mod in_process;
pub mod loader;

// Re-exports
pub use dispatcher::{BatchDispatcher, BatchReport, DispatcherConfig, RunRecord};
pub use in_process::InProcessExecutor;
pub use loader::load_input_list;
