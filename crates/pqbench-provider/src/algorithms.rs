use pqbench_common::{AlgorithmDescriptor, AlgorithmFamily, BenchError, SecurityLevel};
use pqcrypto_dilithium::{dilithium2, dilithium3, dilithium5};
use pqcrypto_kyber::{kyber1024, kyber512, kyber768};
use std::fmt;
use std::str::FromStr;

/// ML-KEM parameter sets, served by round-3 Kyber.
///
/// Key, ciphertext and secret sizes match FIPS 203; the bytes themselves do not interoperate
/// with a FIPS 203 implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KemAlgorithm {
    MlKem512,
    MlKem768,
    MlKem1024,
}

impl KemAlgorithm {
    pub const ALL: [KemAlgorithm; 3] = [
        KemAlgorithm::MlKem512,
        KemAlgorithm::MlKem768,
        KemAlgorithm::MlKem1024,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            KemAlgorithm::MlKem512 => "ML-KEM-512",
            KemAlgorithm::MlKem768 => "ML-KEM-768",
            KemAlgorithm::MlKem1024 => "ML-KEM-1024",
        }
    }

    pub fn security_level(&self) -> SecurityLevel {
        match self {
            KemAlgorithm::MlKem512 => SecurityLevel::Level1,
            KemAlgorithm::MlKem768 => SecurityLevel::Level3,
            KemAlgorithm::MlKem1024 => SecurityLevel::Level5,
        }
    }

    pub fn public_key_bytes(&self) -> usize {
        match self {
            KemAlgorithm::MlKem512 => kyber512::public_key_bytes(),
            KemAlgorithm::MlKem768 => kyber768::public_key_bytes(),
            KemAlgorithm::MlKem1024 => kyber1024::public_key_bytes(),
        }
    }

    pub fn ciphertext_bytes(&self) -> usize {
        match self {
            KemAlgorithm::MlKem512 => kyber512::ciphertext_bytes(),
            KemAlgorithm::MlKem768 => kyber768::ciphertext_bytes(),
            KemAlgorithm::MlKem1024 => kyber1024::ciphertext_bytes(),
        }
    }

    pub fn shared_secret_bytes(&self) -> usize {
        match self {
            KemAlgorithm::MlKem512 => kyber512::shared_secret_bytes(),
            KemAlgorithm::MlKem768 => kyber768::shared_secret_bytes(),
            KemAlgorithm::MlKem1024 => kyber1024::shared_secret_bytes(),
        }
    }

    pub fn descriptor(&self, enabled: bool) -> AlgorithmDescriptor {
        AlgorithmDescriptor::new(
            self.name(),
            AlgorithmFamily::Kem,
            self.security_level(),
            enabled,
        )
    }
}

impl fmt::Display for KemAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KemAlgorithm {
    type Err = BenchError;

    /// Accepts the FIPS 203 names and the round-3 Kyber names, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ML-KEM-512" | "MLKEM512" | "KYBER512" => Ok(KemAlgorithm::MlKem512),
            "ML-KEM-768" | "MLKEM768" | "KYBER768" => Ok(KemAlgorithm::MlKem768),
            "ML-KEM-1024" | "MLKEM1024" | "KYBER1024" => Ok(KemAlgorithm::MlKem1024),
            _ => Err(BenchError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// ML-DSA parameter sets, served by round-3 Dilithium.
///
/// Sizes match FIPS 204; signatures do not verify under a FIPS 204 implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    MlDsa44,
    MlDsa65,
    MlDsa87,
}

impl SignatureAlgorithm {
    pub const ALL: [SignatureAlgorithm; 3] = [
        SignatureAlgorithm::MlDsa44,
        SignatureAlgorithm::MlDsa65,
        SignatureAlgorithm::MlDsa87,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SignatureAlgorithm::MlDsa44 => "ML-DSA-44",
            SignatureAlgorithm::MlDsa65 => "ML-DSA-65",
            SignatureAlgorithm::MlDsa87 => "ML-DSA-87",
        }
    }

    /// ML-DSA-44 is category 2; we report it with the 128-bit tier.
    pub fn security_level(&self) -> SecurityLevel {
        match self {
            SignatureAlgorithm::MlDsa44 => SecurityLevel::Level1,
            SignatureAlgorithm::MlDsa65 => SecurityLevel::Level3,
            SignatureAlgorithm::MlDsa87 => SecurityLevel::Level5,
        }
    }

    pub fn public_key_bytes(&self) -> usize {
        match self {
            SignatureAlgorithm::MlDsa44 => dilithium2::public_key_bytes(),
            SignatureAlgorithm::MlDsa65 => dilithium3::public_key_bytes(),
            SignatureAlgorithm::MlDsa87 => dilithium5::public_key_bytes(),
        }
    }

    pub fn signature_bytes(&self) -> usize {
        match self {
            SignatureAlgorithm::MlDsa44 => dilithium2::signature_bytes(),
            SignatureAlgorithm::MlDsa65 => dilithium3::signature_bytes(),
            SignatureAlgorithm::MlDsa87 => dilithium5::signature_bytes(),
        }
    }

    pub fn descriptor(&self, enabled: bool) -> AlgorithmDescriptor {
        AlgorithmDescriptor::new(
            self.name(),
            AlgorithmFamily::Signature,
            self.security_level(),
            enabled,
        )
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ML-DSA-44" | "MLDSA44" | "DILITHIUM2" => Ok(SignatureAlgorithm::MlDsa44),
            "ML-DSA-65" | "MLDSA65" | "DILITHIUM3" => Ok(SignatureAlgorithm::MlDsa65),
            "ML-DSA-87" | "MLDSA87" | "DILITHIUM5" => Ok(SignatureAlgorithm::MlDsa87),
            _ => Err(BenchError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}
