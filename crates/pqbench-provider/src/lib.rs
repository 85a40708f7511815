pub mod algorithms;
pub mod kem;
pub mod provider;
pub mod sign;
mod wipe;


use pqbench_common::{AlgorithmDescriptor, BenchError};
use zeroize::Zeroizing;

pub use algorithms::{KemAlgorithm, SignatureAlgorithm};
pub use provider::PqcryptoProvider;

/// Shared secrets are wiped as soon as the caller drops them.
pub type SharedSecret = Zeroizing<Vec<u8>>;

/// A source of post-quantum primitives, addressed by algorithm name.
///
/// Implementations must be shareable across worker threads; the sessions they hand out are
/// not, and each unit of work acquires its own.
pub trait CryptoProvider: Send + Sync {
    /// Human readable provider identification
    fn name(&self) -> &str;

    /// Caveats about how the advertised names map onto the backing implementation
    fn compatibility_note(&self) -> Option<&str> {
        None
    }

    fn kem_algorithms(&self) -> Vec<AlgorithmDescriptor>;

    fn signature_algorithms(&self) -> Vec<AlgorithmDescriptor>;

    fn new_kem_session(&self, name: &str) -> Result<Box<dyn KemSession>, BenchError>;

    fn new_signature_session(&self, name: &str)
        -> Result<Box<dyn SignatureSession>, BenchError>;

    /// Looks up an advertised mechanism. Providers that accept aliases override this.
    fn resolve(&self, name: &str) -> Option<AlgorithmDescriptor> {
        self.kem_algorithms()
            .into_iter()
            .chain(self.signature_algorithms())
            .find(|d| d.name() == name)
    }
}

/// One party's KEM context. The session's copy of the secret key is wiped when it drops.
pub trait KemSession: Send {
    fn algorithm(&self) -> &str;

    /// Generates a fresh keypair, keeps the secret half and returns the public key
    fn generate_keypair(&mut self) -> Result<Vec<u8>, BenchError>;

    /// Returns (ciphertext, shared secret)
    fn encapsulate(&self, public_key: &[u8]) -> Result<(Vec<u8>, SharedSecret), BenchError>;

    fn decapsulate(&self, ciphertext: &[u8]) -> Result<SharedSecret, BenchError>;
}

/// One party's signature context.
pub trait SignatureSession: Send {
    fn algorithm(&self) -> &str;

    fn generate_keypair(&mut self) -> Result<Vec<u8>, BenchError>;

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, BenchError>;

    /// `Ok(false)` for a signature that does not verify; `Err` only for provider faults
    fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8])
        -> Result<bool, BenchError>;
}
