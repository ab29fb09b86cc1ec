// Dockbatch Core - Domain Logic & Ports
// NO process spawning here: the external task is reached through port::TaskExecutor

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{BatchError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
