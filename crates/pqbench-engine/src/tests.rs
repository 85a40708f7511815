use crate::{BenchConfig, OperationFilter, OperationRunner, Orchestrator};
use pqbench_common::{
    AlgorithmDescriptor, AlgorithmFamily, BenchError, FailureReason, OperationKind, SecurityLevel,
    SizeMetrics,
};
use pqbench_provider::{CryptoProvider, KemSession, SharedSecret, SignatureSession};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Scripted provider: the algorithm name decides how each session behaves.
#[derive(Default)]
struct FakeProvider {
    opened: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
}

const FAKE_KEMS: [&str; 8] = [
    "FAKE-KEM",
    "LYING-KEM",
    "BROKEN-KEM",
    "PANIC-KEM",
    "SLOW-KEM",
    "SLOW-SETUP-KEM",
    "SLOW-DROP-KEM",
    "SLOW-DROP-PANIC-KEM",
];

const SLOW_DROP: Duration = Duration::from_millis(200);
const FAKE_SIGS: [&str; 3] = ["FAKE-SIG", "FORGED-SIG", "DISABLED-SIG"];

impl FakeProvider {
    fn guard(&self) -> LiveGuard {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        LiveGuard(self.live.clone())
    }

    fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// Decrements the live-session count when the owning session is dropped
struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

struct FakeKem {
    name: String,
    _guard: LiveGuard,
}

impl KemSession for FakeKem {
    fn algorithm(&self) -> &str {
        &self.name
    }

    fn generate_keypair(&mut self) -> Result<Vec<u8>, BenchError> {
        if self.name == "SLOW-KEM" {
            thread::sleep(Duration::from_millis(300));
        }
        Ok(vec![7u8; 16])
    }

    fn encapsulate(&self, public_key: &[u8]) -> Result<(Vec<u8>, SharedSecret), BenchError> {
        match self.name.as_str() {
            "PANIC-KEM" | "SLOW-DROP-PANIC-KEM" => panic!("native encapsulation crashed"),
            "SLOW-DROP-KEM" => {
                return Err(BenchError::Provider("encapsulation rejected".into()));
            }
            _ => {}
        }
        let ciphertext: Vec<u8> = public_key.iter().take(8).map(|b| b ^ 0x5a).collect();
        let secret = SharedSecret::new(ciphertext.iter().take(4).copied().collect());
        Ok((ciphertext, secret))
    }

    fn decapsulate(&self, ciphertext: &[u8]) -> Result<SharedSecret, BenchError> {
        let mut secret: Vec<u8> = ciphertext.iter().take(4).copied().collect();
        if self.name == "LYING-KEM" {
            secret[0] ^= 1;
        }
        Ok(SharedSecret::new(secret))
    }
}

impl Drop for FakeKem {
    fn drop(&mut self) {
        if self.name.starts_with("SLOW-DROP") {
            thread::sleep(SLOW_DROP);
        }
    }
}

struct FakeSig {
    name: String,
    _guard: LiveGuard,
}

impl SignatureSession for FakeSig {
    fn algorithm(&self) -> &str {
        &self.name
    }

    fn generate_keypair(&mut self) -> Result<Vec<u8>, BenchError> {
        Ok(vec![3u8; 24])
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, BenchError> {
        Ok(message.iter().rev().copied().collect())
    }

    fn verify(&self, message: &[u8], signature: &[u8], _pk: &[u8]) -> Result<bool, BenchError> {
        if self.name == "FORGED-SIG" {
            return Ok(false);
        }
        Ok(message.iter().rev().copied().collect::<Vec<_>>() == signature)
    }
}

impl CryptoProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn kem_algorithms(&self) -> Vec<AlgorithmDescriptor> {
        FAKE_KEMS
            .iter()
            .map(|n| AlgorithmDescriptor::new(*n, AlgorithmFamily::Kem, SecurityLevel::Level1, true))
            .collect()
    }

    fn signature_algorithms(&self) -> Vec<AlgorithmDescriptor> {
        FAKE_SIGS
            .iter()
            .map(|n| {
                AlgorithmDescriptor::new(
                    *n,
                    AlgorithmFamily::Signature,
                    SecurityLevel::Level3,
                    *n != "DISABLED-SIG",
                )
            })
            .collect()
    }

    fn new_kem_session(&self, name: &str) -> Result<Box<dyn KemSession>, BenchError> {
        if !FAKE_KEMS.contains(&name) {
            return Err(BenchError::UnsupportedAlgorithm(name.to_string()));
        }
        if name == "BROKEN-KEM" {
            return Err(BenchError::Provider("native context allocation failed".into()));
        }
        if name == "SLOW-SETUP-KEM" {
            thread::sleep(Duration::from_millis(100));
        }
        Ok(Box::new(FakeKem {
            name: name.to_string(),
            _guard: self.guard(),
        }))
    }

    fn new_signature_session(&self, name: &str) -> Result<Box<dyn SignatureSession>, BenchError> {
        if !FAKE_SIGS.contains(&name) || name == "DISABLED-SIG" {
            return Err(BenchError::UnsupportedAlgorithm(name.to_string()));
        }
        Ok(Box::new(FakeSig {
            name: name.to_string(),
            _guard: self.guard(),
        }))
    }
}

fn setup() -> (Arc<FakeProvider>, Orchestrator) {
    let provider = Arc::new(FakeProvider::default());
    let orchestrator = Orchestrator::new(provider.clone());
    (provider, orchestrator)
}

#[test]
fn test_runner_kem_exchange() {
    let provider = Arc::new(FakeProvider::default());
    let runner = OperationRunner::new(provider.clone(), "msg");

    let result = runner.run_kem_exchange("FAKE-KEM");
    assert!(result.is_success());
    assert_eq!(result.kind(), OperationKind::KemExchange);
    assert_eq!(
        result.sizes(),
        Some(&SizeMetrics::Kem {
            public_key: 16,
            ciphertext: 8,
            shared_secret: 4
        })
    );
    assert!(result.is_consistent());

    // Two parties, both released
    assert_eq!(provider.opened(), 2);
    assert_eq!(provider.live(), 0);
}

#[test]
fn test_runner_sign_verify() {
    let provider = Arc::new(FakeProvider::default());
    let runner = OperationRunner::new(provider.clone(), "Hello, Quantum World!");

    let result = runner.run_sign_verify("FAKE-SIG");
    assert!(result.is_success());
    assert_eq!(
        result.sizes(),
        Some(&SizeMetrics::Signature {
            public_key: 24,
            signature: 21,
            message: 21
        })
    );
    assert_eq!(provider.live(), 0);
}

#[test]
fn test_runner_captures_panics() {
    let provider = Arc::new(FakeProvider::default());
    let runner = OperationRunner::new(provider.clone(), "msg");

    let result = runner.run_kem_exchange("PANIC-KEM");
    assert!(!result.is_success());
    assert_eq!(result.failure(), Some(FailureReason::Panicked));
    assert!(result.error().unwrap().contains("native encapsulation crashed"));
    assert!(result.is_consistent());

    // Unwinding still released both sessions
    assert_eq!(provider.live(), 0);
}

#[test]
fn test_runner_unsupported_is_a_failed_record() {
    let provider = Arc::new(FakeProvider::default());
    let runner = OperationRunner::new(provider, "msg");

    let result = runner.run_sign_verify("NOPE");
    assert_eq!(result.failure(), Some(FailureReason::UnsupportedAlgorithm));
    assert_eq!(result.duration(), Duration::ZERO);
}

#[test]
fn test_timing_excludes_session_setup() {
    let provider = Arc::new(FakeProvider::default());
    let runner = OperationRunner::new(provider, "msg");

    // Each session takes 100ms to open; the crypto calls are instant
    let result = runner.run_kem_exchange("SLOW-SETUP-KEM");
    assert!(result.is_success());
    assert!(result.duration() < Duration::from_millis(100));
}

#[test]
fn test_failure_timing_excludes_session_teardown() {
    let provider = Arc::new(FakeProvider::default());
    let runner = OperationRunner::new(provider.clone(), "msg");

    // Each session takes 200ms to release; the failing call itself is instant
    let result = runner.run_kem_exchange("SLOW-DROP-KEM");
    assert_eq!(result.failure(), Some(FailureReason::ProviderError));
    assert!(result.error().unwrap().contains("encapsulation rejected"));
    assert!(
        result.duration() < Duration::from_millis(100),
        "duration {:?} includes session teardown",
        result.duration()
    );

    let result = runner.run_kem_exchange("SLOW-DROP-PANIC-KEM");
    assert_eq!(result.failure(), Some(FailureReason::Panicked));
    assert!(result.duration() < Duration::from_millis(100));

    assert_eq!(provider.live(), 0);
    println!("✅ Failure timing stops before session release");
}

#[tokio::test]
async fn test_failure_isolation() {
    let (provider, orchestrator) = setup();
    let config = BenchConfig::new(["FAKE-KEM", "BROKEN-KEM", "FAKE-SIG"], OperationFilter::Both);

    let report = orchestrator.run(&config).await.unwrap();

    assert_eq!(report.len(), 3);
    assert!(report.get("FAKE-KEM").unwrap().results[0].is_success());
    assert!(report.get("FAKE-SIG").unwrap().results[0].is_success());

    let broken = &report.get("BROKEN-KEM").unwrap().results;
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].failure(), Some(FailureReason::ProviderError));
    assert!(broken[0].error().unwrap().contains("allocation failed"));
    assert!(broken[0].sizes().is_none());

    assert_eq!(provider.live(), 0);
}

#[tokio::test]
async fn test_verification_mismatch() {
    let (_, orchestrator) = setup();
    let config = BenchConfig::new(["LYING-KEM", "FORGED-SIG"], OperationFilter::Both);

    let report = orchestrator.run(&config).await.unwrap();

    for entry in report.entries() {
        assert_eq!(entry.results.len(), 1);
        let result = &entry.results[0];
        assert!(!result.is_success());
        assert_eq!(result.failure(), Some(FailureReason::VerificationMismatch));
        assert!(result.error().is_none());
        assert!(result.sizes().is_none());
    }
}

#[tokio::test]
async fn test_non_applicable_pairs_are_skipped() {
    let (provider, orchestrator) = setup();
    let config = BenchConfig::new(
        ["ML-KEM-9999", "FAKE-KEM", "DISABLED-SIG"],
        OperationFilter::Signature,
    );

    let report = orchestrator.run(&config).await.unwrap();

    // Every configured name gets an entry, none gets an attempt
    assert_eq!(report.len(), 3);
    assert_eq!(report.total_operations(), 0);
    assert_eq!(provider.opened(), 0);
}

#[tokio::test]
async fn test_order_and_kind_order() {
    let (_, orchestrator) = setup();
    let config = BenchConfig::new(["FAKE-SIG", "FAKE-KEM", "FAKE-SIG"], OperationFilter::Both);

    let report = orchestrator.run(&config).await.unwrap();

    let names: Vec<_> = report.entries().iter().map(|e| e.algorithm.as_str()).collect();
    assert_eq!(names, vec!["FAKE-SIG", "FAKE-KEM"]);
    // A repeated name is attempted again and lands in the same entry
    assert_eq!(report.get("FAKE-SIG").unwrap().results.len(), 2);
    assert_eq!(
        report.get("FAKE-KEM").unwrap().results[0].kind(),
        OperationKind::KemExchange
    );
}

#[tokio::test]
async fn test_timeout_is_recorded_and_sessions_released() {
    let (provider, orchestrator) = setup();
    let config = BenchConfig::new(["SLOW-KEM", "FAKE-KEM"], OperationFilter::Kem)
        .with_timeout(Duration::from_millis(50));

    let report = orchestrator.run(&config).await.unwrap();

    let slow = &report.get("SLOW-KEM").unwrap().results[0];
    assert_eq!(slow.failure(), Some(FailureReason::Timeout));
    assert_eq!(slow.duration(), Duration::from_millis(50));
    assert!(slow.error().unwrap().contains("Timed Out"));
    assert!(report.get("FAKE-KEM").unwrap().results[0].is_success());

    // The abandoned operation finishes in the background and drops its sessions
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(provider.live(), 0);
}

#[tokio::test]
async fn test_parallel_matches_sequential() {
    let names = ["FAKE-KEM", "BROKEN-KEM", "LYING-KEM", "FAKE-SIG", "UNKNOWN", "PANIC-KEM"];

    let (_, orchestrator) = setup();
    let sequential = orchestrator
        .run(&BenchConfig::new(names, OperationFilter::Both))
        .await
        .unwrap();

    let (provider, orchestrator) = setup();
    let parallel = orchestrator
        .run(&BenchConfig::new(names, OperationFilter::Both).with_parallel(3))
        .await
        .unwrap();

    assert_eq!(sequential.len(), parallel.len());
    for (a, b) in sequential.entries().iter().zip(parallel.entries()) {
        assert_eq!(a.algorithm, b.algorithm);
        assert_eq!(a.results.len(), b.results.len());
        for (ra, rb) in a.results.iter().zip(&b.results) {
            assert_eq!(ra.is_success(), rb.is_success());
            assert_eq!(ra.failure(), rb.failure());
        }
    }
    assert_eq!(provider.live(), 0);
}

#[tokio::test]
async fn test_parallel_timeouts_do_not_block_others() {
    let (provider, orchestrator) = setup();
    let config = BenchConfig::new(["SLOW-KEM", "FAKE-KEM", "FAKE-SIG"], OperationFilter::Both)
        .with_timeout(Duration::from_millis(50))
        .with_parallel(3);

    let report = orchestrator.run(&config).await.unwrap();

    assert_eq!(
        report.get("SLOW-KEM").unwrap().results[0].failure(),
        Some(FailureReason::Timeout)
    );
    assert!(report.get("FAKE-KEM").unwrap().results[0].is_success());
    assert!(report.get("FAKE-SIG").unwrap().results[0].is_success());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(provider.live(), 0);
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let (_, orchestrator) = setup();
    let config = BenchConfig {
        workers: 0,
        ..BenchConfig::default()
    };
    assert!(matches!(
        orchestrator.run(&config).await,
        Err(BenchError::Config(_))
    ));
}
