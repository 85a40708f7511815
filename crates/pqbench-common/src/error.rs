use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BenchError {
    #[error("Unsupported Algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Provider Error: {0}")]
    Provider(String),

    #[error("Verification Mismatch: {0}")]
    VerificationMismatch(String),

    #[error("Operation Timed Out after {0:?}")]
    Timeout(Duration),

    #[error("Provider Initialization Error: {0}")]
    ProviderInitialization(String),

    #[error("Serialization Error: {0}")]
    Serialization(String),

    #[error("Config Error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for BenchError {
    fn from(e: serde_json::Error) -> Self {
        BenchError::Serialization(e.to_string())
    }
}

impl From<postcard::Error> for BenchError {
    fn from(e: postcard::Error) -> Self {
        BenchError::Serialization(e.to_string())
    }
}
