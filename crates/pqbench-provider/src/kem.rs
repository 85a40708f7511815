use crate::algorithms::KemAlgorithm;
use crate::wipe::wipe_native;
use crate::{KemSession, SharedSecret};
use pqbench_common::BenchError;
use pqcrypto_traits::kem::{Ciphertext as _, PublicKey as _, SecretKey as _, SharedSecret as _};
use tracing::debug;
use zeroize::Zeroizing;

/// Runs `$body` with `$m` bound to the pqcrypto module for `$alg`.
macro_rules! with_kyber {
    ($alg:expr, $m:ident => $body:expr) => {
        match $alg {
            KemAlgorithm::MlKem512 => {
                use pqcrypto_kyber::kyber512 as $m;
                $body
            }
            KemAlgorithm::MlKem768 => {
                use pqcrypto_kyber::kyber768 as $m;
                $body
            }
            KemAlgorithm::MlKem1024 => {
                use pqcrypto_kyber::kyber1024 as $m;
                $body
            }
        }
    };
}

/// A KEM party backed by the PQClean Kyber code.
///
/// The secret key is held as zeroizing bytes and rebuilt per decapsulation. The native key
/// and secret structs are wiped in place after each call. Copies the compiler makes when
/// moving those `Copy` values, and the C code's own stack buffers, are out of reach.
pub struct PqKemSession {
    algorithm: KemAlgorithm,
    secret_key: Option<Zeroizing<Vec<u8>>>,
}

impl PqKemSession {
    pub fn new(algorithm: KemAlgorithm) -> Self {
        Self {
            algorithm,
            secret_key: None,
        }
    }

    pub fn has_keypair(&self) -> bool {
        self.secret_key.is_some()
    }
}

impl KemSession for PqKemSession {
    fn algorithm(&self) -> &str {
        self.algorithm.name()
    }

    fn generate_keypair(&mut self) -> Result<Vec<u8>, BenchError> {
        let (pk, sk) = with_kyber!(self.algorithm, m => {
            let (pk, mut sk) = m::keypair();
            let sk_bytes = Zeroizing::new(sk.as_bytes().to_vec());
            // SAFETY: pqcrypto secret keys are plain byte arrays
            unsafe { wipe_native(&mut sk) };
            (pk.as_bytes().to_vec(), sk_bytes)
        });
        // Replacing an older key drops (and wipes) it
        self.secret_key = Some(sk);
        Ok(pk)
    }

    fn encapsulate(&self, public_key: &[u8]) -> Result<(Vec<u8>, SharedSecret), BenchError> {
        with_kyber!(self.algorithm, m => {
            let pk = m::PublicKey::from_bytes(public_key).map_err(|e| {
                BenchError::Provider(format!(
                    "malformed {} public key ({} bytes): {}",
                    self.algorithm,
                    public_key.len(),
                    e
                ))
            })?;
            let (mut shared_secret, ciphertext) = m::encapsulate(&pk);
            let secret = Zeroizing::new(shared_secret.as_bytes().to_vec());
            // SAFETY: pqcrypto shared secrets are plain byte arrays
            unsafe { wipe_native(&mut shared_secret) };
            Ok((ciphertext.as_bytes().to_vec(), secret))
        })
    }

    fn decapsulate(&self, ciphertext: &[u8]) -> Result<SharedSecret, BenchError> {
        let sk_bytes = self.secret_key.as_ref().ok_or_else(|| {
            BenchError::Provider(format!(
                "{} decapsulation requested before keypair generation",
                self.algorithm
            ))
        })?;

        with_kyber!(self.algorithm, m => {
            let ct = m::Ciphertext::from_bytes(ciphertext).map_err(|e| {
                BenchError::Provider(format!(
                    "malformed {} ciphertext ({} bytes): {}",
                    self.algorithm,
                    ciphertext.len(),
                    e
                ))
            })?;
            let mut sk = m::SecretKey::from_bytes(sk_bytes)
                .map_err(|e| BenchError::Provider(format!("corrupt secret key: {}", e)))?;
            let mut shared_secret = m::decapsulate(&ct, &sk);
            let secret = Zeroizing::new(shared_secret.as_bytes().to_vec());
            // SAFETY: pqcrypto secret keys and shared secrets are plain byte arrays
            unsafe {
                wipe_native(&mut sk);
                wipe_native(&mut shared_secret);
            }
            Ok(secret)
        })
    }
}

impl Drop for PqKemSession {
    fn drop(&mut self) {
        debug!(
            algorithm = self.algorithm.name(),
            had_keypair = self.secret_key.is_some(),
            "Releasing KEM session"
        );
    }
}
