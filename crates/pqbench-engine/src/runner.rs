use crate::timer::Timer;
use pqbench_common::{BenchError, FailureReason, OperationKind, OperationResult, SizeMetrics};
use pqbench_provider::CryptoProvider;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// Performs exactly one verifiable round-trip and reports it as an [`OperationResult`].
///
/// Nothing escapes this boundary: provider errors and panics alike become failed records.
#[derive(Clone)]
pub struct OperationRunner {
    provider: Arc<dyn CryptoProvider>,
    message: Arc<[u8]>,
}

impl OperationRunner {
    pub fn new(provider: Arc<dyn CryptoProvider>, message: impl AsRef<[u8]>) -> Self {
        Self {
            provider,
            message: Arc::from(message.as_ref()),
        }
    }

    pub fn run(&self, kind: OperationKind, algorithm: &str) -> OperationResult {
        match kind {
            OperationKind::KemExchange => self.run_kem_exchange(algorithm),
            OperationKind::SignVerify => self.run_sign_verify(algorithm),
        }
    }

    pub fn run_kem_exchange(&self, algorithm: &str) -> OperationResult {
        self.guarded(algorithm, OperationKind::KemExchange, |timer| {
            self.kem_round_trip(algorithm, timer)
        })
    }

    pub fn run_sign_verify(&self, algorithm: &str) -> OperationResult {
        self.guarded(algorithm, OperationKind::SignVerify, |timer| {
            self.signature_round_trip(algorithm, timer)
        })
    }

    /// Runs one round-trip body, converting every way out of it into a result record
    fn guarded<F>(&self, algorithm: &str, kind: OperationKind, body: F) -> OperationResult
    where
        F: FnOnce(&mut Timer) -> Result<SizeMetrics, BenchError>,
    {
        let mut timer = Timer::new();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&mut timer)));
        let duration = timer.stop();

        match outcome {
            Ok(Ok(sizes)) => {
                debug!("{} {} succeeded in {:?}", algorithm, kind, duration);
                OperationResult::succeeded(algorithm, kind, duration, sizes)
            }
            Ok(Err(err)) => {
                warn!("{} {} failed: {}", algorithm, kind, err);
                OperationResult::from_error(algorithm, kind, duration, &err)
            }
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                warn!("{} {} panicked: {}", algorithm, kind, msg);
                OperationResult::failed(algorithm, kind, duration, FailureReason::Panicked, msg)
            }
        }
    }

    fn kem_round_trip(&self, algorithm: &str, timer: &mut Timer) -> Result<SizeMetrics, BenchError> {
        // 1. Acquire both parties before the clock starts
        let mut party_a = self.provider.new_kem_session(algorithm)?;
        let party_b = self.provider.new_kem_session(algorithm)?;

        // 2. A publishes a key, B encapsulates against it, A recovers the secret
        let (public_key, ciphertext, secret_a, secret_b) = timed(timer, || {
            let public_key = party_a.generate_keypair()?;
            let (ciphertext, secret_b) = party_b.encapsulate(&public_key)?;
            let secret_a = party_a.decapsulate(&ciphertext)?;
            Ok((public_key, ciphertext, secret_a, secret_b))
        })?;

        let sizes = SizeMetrics::Kem {
            public_key: public_key.len(),
            ciphertext: ciphertext.len(),
            shared_secret: secret_b.len(),
        };
        if !sizes.is_complete() {
            return Err(BenchError::Provider(format!(
                "{} returned degenerate output",
                algorithm
            )));
        }
        if secret_a.as_slice() != secret_b.as_slice() {
            return Err(BenchError::VerificationMismatch(format!(
                "{} shared secrets differ",
                algorithm
            )));
        }
        // 3. Sessions drop here, after the timer has stopped
        Ok(sizes)
    }

    fn signature_round_trip(
        &self,
        algorithm: &str,
        timer: &mut Timer,
    ) -> Result<SizeMetrics, BenchError> {
        let mut signer = self.provider.new_signature_session(algorithm)?;
        let verifier = self.provider.new_signature_session(algorithm)?;

        let (public_key, signature, valid) = timed(timer, || {
            let public_key = signer.generate_keypair()?;
            let signature = signer.sign(&self.message)?;
            let valid = verifier.verify(&self.message, &signature, &public_key)?;
            Ok((public_key, signature, valid))
        })?;

        let sizes = SizeMetrics::Signature {
            public_key: public_key.len(),
            signature: signature.len(),
            message: self.message.len(),
        };
        if !sizes.is_complete() {
            return Err(BenchError::Provider(format!(
                "{} returned degenerate output",
                algorithm
            )));
        }
        if !valid {
            return Err(BenchError::VerificationMismatch(format!(
                "{} signature rejected",
                algorithm
            )));
        }
        Ok(sizes)
    }
}

/// Times `calls` alone. The timer stops at the failure point, before any session is
/// torn down, whether `calls` returns an error or panics.
fn timed<T, F>(timer: &mut Timer, calls: F) -> Result<T, BenchError>
where
    F: FnOnce() -> Result<T, BenchError>,
{
    timer.start_now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(calls));
    timer.stop();
    match outcome {
        Ok(result) => result,
        Err(payload) => panic::resume_unwind(payload),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
