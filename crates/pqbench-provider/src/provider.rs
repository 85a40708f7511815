use crate::algorithms::{KemAlgorithm, SignatureAlgorithm};
use crate::kem::PqKemSession;
use crate::sign::PqSignatureSession;
use crate::{CryptoProvider, KemSession, SignatureSession};
use pqbench_common::{AlgorithmDescriptor, BenchError};
use tracing::info;

pub const PROVIDER_NAME: &str = "pqcrypto (PQClean reference code)";

pub const COMPATIBILITY_NOTE: &str = "ML-KEM/ML-DSA names run the round-3 Kyber/Dilithium \
     code: sizes match FIPS 203/204, outputs are not interoperable with them";

/// The PQClean-backed provider. Names are validated into enums here, at the boundary.
#[derive(Debug, Clone)]
pub struct PqcryptoProvider {
    enabled_kems: Vec<KemAlgorithm>,
    enabled_sigs: Vec<SignatureAlgorithm>,
}

impl PqcryptoProvider {
    /// Every mechanism compiled into this build
    pub fn new() -> Result<Self, BenchError> {
        Self::with_enabled(KemAlgorithm::ALL.to_vec(), SignatureAlgorithm::ALL.to_vec())
    }

    /// A provider that only advertises (and only opens sessions for) the given mechanisms
    pub fn with_enabled(
        kems: Vec<KemAlgorithm>,
        sigs: Vec<SignatureAlgorithm>,
    ) -> Result<Self, BenchError> {
        if kems.is_empty() && sigs.is_empty() {
            return Err(BenchError::ProviderInitialization(
                "no KEM or signature mechanisms enabled".into(),
            ));
        }

        info!(
            "Provider ready: {} ({} KEM, {} signature mechanisms)",
            PROVIDER_NAME,
            kems.len(),
            sigs.len()
        );
        Ok(Self {
            enabled_kems: kems,
            enabled_sigs: sigs,
        })
    }

    fn enabled_kem(&self, name: &str) -> Result<KemAlgorithm, BenchError> {
        let alg: KemAlgorithm = name.parse()?;
        if self.enabled_kems.contains(&alg) {
            Ok(alg)
        } else {
            Err(BenchError::UnsupportedAlgorithm(format!("{} (disabled)", name)))
        }
    }

    fn enabled_sig(&self, name: &str) -> Result<SignatureAlgorithm, BenchError> {
        let alg: SignatureAlgorithm = name.parse()?;
        if self.enabled_sigs.contains(&alg) {
            Ok(alg)
        } else {
            Err(BenchError::UnsupportedAlgorithm(format!("{} (disabled)", name)))
        }
    }
}

impl CryptoProvider for PqcryptoProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn compatibility_note(&self) -> Option<&str> {
        Some(COMPATIBILITY_NOTE)
    }

    fn kem_algorithms(&self) -> Vec<AlgorithmDescriptor> {
        KemAlgorithm::ALL
            .iter()
            .map(|alg| alg.descriptor(self.enabled_kems.contains(alg)))
            .collect()
    }

    fn signature_algorithms(&self) -> Vec<AlgorithmDescriptor> {
        SignatureAlgorithm::ALL
            .iter()
            .map(|alg| alg.descriptor(self.enabled_sigs.contains(alg)))
            .collect()
    }

    fn new_kem_session(&self, name: &str) -> Result<Box<dyn KemSession>, BenchError> {
        let alg = self.enabled_kem(name)?;
        Ok(Box::new(PqKemSession::new(alg)))
    }

    fn new_signature_session(
        &self,
        name: &str,
    ) -> Result<Box<dyn SignatureSession>, BenchError> {
        let alg = self.enabled_sig(name)?;
        Ok(Box::new(PqSignatureSession::new(alg)))
    }

    /// Resolves aliases such as `Kyber768` to the canonical descriptor
    fn resolve(&self, name: &str) -> Option<AlgorithmDescriptor> {
        if let Ok(alg) = name.parse::<KemAlgorithm>() {
            return Some(alg.descriptor(self.enabled_kems.contains(&alg)));
        }
        if let Ok(alg) = name.parse::<SignatureAlgorithm>() {
            return Some(alg.descriptor(self.enabled_sigs.contains(&alg)));
        }
        None
    }
}
