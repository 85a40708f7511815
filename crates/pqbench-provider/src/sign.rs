use crate::algorithms::SignatureAlgorithm;
use crate::wipe::wipe_native;
use crate::SignatureSession;
use pqbench_common::BenchError;
use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _, SecretKey as _};
use tracing::debug;
use zeroize::Zeroizing;

/// Runs `$body` with `$m` bound to the pqcrypto module for `$alg`.
macro_rules! with_dilithium {
    ($alg:expr, $m:ident => $body:expr) => {
        match $alg {
            SignatureAlgorithm::MlDsa44 => {
                use pqcrypto_dilithium::dilithium2 as $m;
                $body
            }
            SignatureAlgorithm::MlDsa65 => {
                use pqcrypto_dilithium::dilithium3 as $m;
                $body
            }
            SignatureAlgorithm::MlDsa87 => {
                use pqcrypto_dilithium::dilithium5 as $m;
                $body
            }
        }
    };
}

/// A signer or verifier backed by the PQClean Dilithium code.
///
/// Secret key handling matches [`crate::kem::PqKemSession`]: zeroizing bytes at rest, native
/// structs wiped after each call.
pub struct PqSignatureSession {
    algorithm: SignatureAlgorithm,
    secret_key: Option<Zeroizing<Vec<u8>>>,
}

impl PqSignatureSession {
    pub fn new(algorithm: SignatureAlgorithm) -> Self {
        Self {
            algorithm,
            secret_key: None,
        }
    }

}

impl SignatureSession for PqSignatureSession {
    fn algorithm(&self) -> &str {
        self.algorithm.name()
    }

    fn generate_keypair(&mut self) -> Result<Vec<u8>, BenchError> {
        let (pk, sk) = with_dilithium!(self.algorithm, m => {
            let (pk, mut sk) = m::keypair();
            let sk_bytes = Zeroizing::new(sk.as_bytes().to_vec());
            // SAFETY: pqcrypto secret keys are plain byte arrays
            unsafe { wipe_native(&mut sk) };
            (pk.as_bytes().to_vec(), sk_bytes)
        });
        self.secret_key = Some(sk);
        Ok(pk)
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, BenchError> {
        let sk_bytes = self.secret_key.as_ref().ok_or_else(|| {
            BenchError::Provider(format!(
                "{} signing requested before keypair generation",
                self.algorithm
            ))
        })?;

        with_dilithium!(self.algorithm, m => {
            let mut sk = m::SecretKey::from_bytes(sk_bytes)
                .map_err(|e| BenchError::Provider(format!("corrupt signing key: {}", e)))?;
            let signature = m::detached_sign(message, &sk);
            // SAFETY: pqcrypto secret keys are plain byte arrays
            unsafe { wipe_native(&mut sk) };
            Ok(signature.as_bytes().to_vec())
        })
    }

    fn verify(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<bool, BenchError> {
        with_dilithium!(self.algorithm, m => {
            let pk = m::PublicKey::from_bytes(public_key).map_err(|e| {
                BenchError::Provider(format!(
                    "malformed {} public key ({} bytes): {}",
                    self.algorithm,
                    public_key.len(),
                    e
                ))
            })?;
            // A signature of the wrong length is simply invalid
            let sig = match m::DetachedSignature::from_bytes(signature) {
                Ok(sig) => sig,
                Err(_) => return Ok(false),
            };
            Ok(m::verify_detached_signature(&sig, message, &pk).is_ok())
        })
    }
}

impl Drop for PqSignatureSession {
    fn drop(&mut self) {
        debug!(
            algorithm = self.algorithm.name(),
            had_keypair = self.secret_key.is_some(),
            "Releasing signature session"
        );
    }
}
