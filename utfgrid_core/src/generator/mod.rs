//! Runs a generation: configuration, the shared tile queue and the worker pool.

mod config;
pub use config::*;

mod pool;
pub use pool::*;

mod queue;
pub use queue::*;

mod report;
pub use report::*;
