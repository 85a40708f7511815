pub mod algorithm;
pub mod error;
pub mod report;
pub mod result;

// Re-export commonly used types
pub use algorithm::{AlgorithmDescriptor, AlgorithmFamily, SecurityLevel};
pub use error::BenchError;
pub use report::{AlgorithmEntry, BenchmarkReport};
pub use result::{FailureReason, OperationKind, OperationResult, SizeMetrics};
