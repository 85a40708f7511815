use crate::algorithm::AlgorithmFamily;
use crate::error::BenchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    KemExchange,
    SignVerify,
}

impl OperationKind {
    /// The algorithm family this operation can run against
    pub fn family(&self) -> AlgorithmFamily {
        match self {
            OperationKind::KemExchange => AlgorithmFamily::Kem,
            OperationKind::SignVerify => AlgorithmFamily::Signature,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::KemExchange => write!(f, "KEM Exchange"),
            OperationKind::SignVerify => write!(f, "Digital Signature"),
        }
    }
}

/// Why an operation did not succeed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    UnsupportedAlgorithm,
    ProviderError,
    /// The round-trip completed but the secrets or the signature did not check out
    VerificationMismatch,
    Timeout,
    Panicked,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureReason::UnsupportedAlgorithm => "unsupported algorithm",
            FailureReason::ProviderError => "provider error",
            FailureReason::VerificationMismatch => "verification mismatch",
            FailureReason::Timeout => "timeout",
            FailureReason::Panicked => "provider panicked",
        };
        f.write_str(text)
    }
}

/// Byte sizes observed during one successful round-trip.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SizeMetrics {
    Kem {
        public_key: usize,
        ciphertext: usize,
        shared_secret: usize,
    },
    Signature {
        public_key: usize,
        signature: usize,
        message: usize,
    },
}

impl SizeMetrics {
    pub fn public_key(&self) -> usize {
        match self {
            SizeMetrics::Kem { public_key, .. } | SizeMetrics::Signature { public_key, .. } => {
                *public_key
            }
        }
    }

    /// True when every recorded size is non-zero
    pub fn is_complete(&self) -> bool {
        match *self {
            SizeMetrics::Kem {
                public_key,
                ciphertext,
                shared_secret,
            } => public_key > 0 && ciphertext > 0 && shared_secret > 0,
            SizeMetrics::Signature {
                public_key,
                signature,
                message,
            } => public_key > 0 && signature > 0 && message > 0,
        }
    }

    /// Labelled sizes in display order
    pub fn fields(&self) -> [(&'static str, usize); 3] {
        match *self {
            SizeMetrics::Kem {
                public_key,
                ciphertext,
                shared_secret,
            } => [
                ("Public Key Size", public_key),
                ("Ciphertext Size", ciphertext),
                ("Shared Secret Size", shared_secret),
            ],
            SizeMetrics::Signature {
                public_key,
                signature,
                message,
            } => [
                ("Public Key Size", public_key),
                ("Signature Size", signature),
                ("Message Size", message),
            ],
        }
    }
}

/// The record of one operation attempt.
///
/// Fields are private: the constructors are the only way to build a result, so a
/// successful record always carries complete sizes and a failed one never does.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OperationResult {
    algorithm: String,
    kind: OperationKind,
    duration: Duration,
    success: bool,
    sizes: Option<SizeMetrics>,
    failure: Option<FailureReason>,
    error: Option<String>,
}

impl OperationResult {
    pub fn succeeded(
        algorithm: impl Into<String>,
        kind: OperationKind,
        duration: Duration,
        sizes: SizeMetrics,
    ) -> Self {
        debug_assert!(sizes.is_complete(), "successful result with empty sizes");
        Self {
            algorithm: algorithm.into(),
            kind,
            duration,
            success: true,
            sizes: Some(sizes),
            failure: None,
            error: None,
        }
    }

    pub fn failed(
        algorithm: impl Into<String>,
        kind: OperationKind,
        duration: Duration,
        reason: FailureReason,
        error: impl Into<String>,
    ) -> Self {
        Self {
            algorithm: algorithm.into(),
            kind,
            duration,
            success: false,
            sizes: None,
            failure: Some(reason),
            error: Some(error.into()),
        }
    }

    /// A completed round-trip whose output did not verify. Carries no error text.
    pub fn mismatch(algorithm: impl Into<String>, kind: OperationKind, duration: Duration) -> Self {
        Self {
            algorithm: algorithm.into(),
            kind,
            duration,
            success: false,
            sizes: None,
            failure: Some(FailureReason::VerificationMismatch),
            error: None,
        }
    }

    /// Converts a captured error into a failed record
    pub fn from_error(
        algorithm: impl Into<String>,
        kind: OperationKind,
        duration: Duration,
        err: &BenchError,
    ) -> Self {
        let reason = match err {
            BenchError::VerificationMismatch(_) => {
                return Self::mismatch(algorithm, kind, duration)
            }
            BenchError::UnsupportedAlgorithm(_) => FailureReason::UnsupportedAlgorithm,
            BenchError::Timeout(_) => FailureReason::Timeout,
            _ => FailureReason::ProviderError,
        };
        Self::failed(algorithm, kind, duration, reason, err.to_string())
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn sizes(&self) -> Option<&SizeMetrics> {
        self.sizes.as_ref()
    }

    pub fn failure(&self) -> Option<FailureReason> {
        self.failure
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Checks the success/failure invariants. Used after decoding untrusted input.
    pub fn is_consistent(&self) -> bool {
        if self.success {
            self.failure.is_none()
                && self.error.is_none()
                && self.sizes.is_some_and(|s| s.is_complete())
        } else {
            match self.failure {
                None => false,
                Some(FailureReason::VerificationMismatch) => {
                    self.sizes.is_none() && self.error.is_none()
                }
                Some(_) => self.sizes.is_none() && self.error.is_some(),
            }
        }
    }
}
