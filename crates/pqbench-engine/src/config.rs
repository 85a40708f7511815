use pqbench_common::{BenchError, OperationKind};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Low/medium/high security KEM and signature variants
pub const DEFAULT_ALGORITHMS: [&str; 6] = [
    "ML-KEM-512",
    "ML-KEM-768",
    "ML-KEM-1024",
    "ML-DSA-44",
    "ML-DSA-65",
    "ML-DSA-87",
];

pub const DEFAULT_MESSAGE: &str = "Hello, Quantum World!";

/// Ceiling on `workers`; each worker holds one semaphore permit
pub const MAX_WORKERS: usize = 1024;

/// Which operation kinds a run should attempt.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OperationFilter {
    Kem,
    #[serde(rename = "sig", alias = "signature")]
    Signature,
    #[default]
    Both,
}

impl OperationFilter {
    /// Requested kinds, KEM first
    pub fn kinds(&self) -> Vec<OperationKind> {
        match self {
            OperationFilter::Kem => vec![OperationKind::KemExchange],
            OperationFilter::Signature => vec![OperationKind::SignVerify],
            OperationFilter::Both => vec![OperationKind::KemExchange, OperationKind::SignVerify],
        }
    }

    pub fn includes(&self, kind: OperationKind) -> bool {
        self.kinds().contains(&kind)
    }
}

impl FromStr for OperationFilter {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kem" => Ok(OperationFilter::Kem),
            "sig" | "signature" => Ok(OperationFilter::Signature),
            "both" | "all" => Ok(OperationFilter::Both),
            other => Err(BenchError::Config(format!(
                "unknown operation filter '{}' (expected kem, sig or both)",
                other
            ))),
        }
    }
}

impl fmt::Display for OperationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationFilter::Kem => f.write_str("kem"),
            OperationFilter::Signature => f.write_str("sig"),
            OperationFilter::Both => f.write_str("both"),
        }
    }
}

/// Everything one `run` needs. Passed explicitly; there is no global state.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    pub algorithms: Vec<String>,
    pub operations: OperationFilter,
    /// Per-operation limit in milliseconds
    pub timeout_ms: Option<u64>,
    pub parallel: bool,
    /// Upper bound on concurrently benchmarked algorithms in parallel mode
    pub workers: usize,
    /// Signed by every signature round-trip
    pub message: String,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            algorithms: DEFAULT_ALGORITHMS.iter().map(|s| s.to_string()).collect(),
            operations: OperationFilter::Both,
            timeout_ms: None,
            parallel: false,
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            message: DEFAULT_MESSAGE.to_string(),
        }
    }
}

impl BenchConfig {
    pub fn new<I, S>(algorithms: I, operations: OperationFilter) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            algorithms: algorithms.into_iter().map(Into::into).collect(),
            operations,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis().max(1)).unwrap_or(u64::MAX));
        self
    }

    pub fn with_parallel(mut self, workers: usize) -> Self {
        self.parallel = true;
        self.workers = workers;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, BenchError> {
        let config: Self = toml::from_str(text).map_err(|e| BenchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BenchError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| BenchError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.algorithms.is_empty() {
            return Err(BenchError::Config("algorithm list is empty".into()));
        }
        if self.algorithms.iter().any(|a| a.trim().is_empty()) {
            return Err(BenchError::Config("algorithm names must not be blank".into()));
        }
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(BenchError::Config(format!(
                "workers must be between 1 and {}",
                MAX_WORKERS
            )));
        }
        if self.timeout_ms == Some(0) {
            return Err(BenchError::Config("timeout_ms must be positive".into()));
        }
        if self.message.is_empty() {
            return Err(BenchError::Config("signature message must not be empty".into()));
        }
        Ok(())
    }
}
