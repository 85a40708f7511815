pub mod config;
pub mod orchestrator;
pub mod runner;
pub mod timer;

#[cfg(test)]
mod tests;

pub use config::{
    BenchConfig, OperationFilter, DEFAULT_ALGORITHMS, DEFAULT_MESSAGE, MAX_WORKERS,
};
pub use orchestrator::Orchestrator;
pub use runner::OperationRunner;
pub use timer::Timer;
