use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmFamily {
    Kem,
    Signature,
}

impl fmt::Display for AlgorithmFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmFamily::Kem => write!(f, "KEM"),
            AlgorithmFamily::Signature => write!(f, "Signature"),
        }
    }
}

/// NIST post-quantum security categories.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SecurityLevel {
    Level1,
    Level3,
    Level5,
}

impl SecurityLevel {
    /// Equivalent classical security strength in bits
    pub fn classical_bits(&self) -> u16 {
        match self {
            SecurityLevel::Level1 => 128,
            SecurityLevel::Level3 => 192,
            SecurityLevel::Level5 => 256,
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            SecurityLevel::Level1 => 1,
            SecurityLevel::Level3 => 3,
            SecurityLevel::Level5 => 5,
        };
        write!(f, "NIST Level {} ({}-bit)", level, self.classical_bits())
    }
}

/// A mechanism as advertised by the provider. Built once, then only read.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlgorithmDescriptor {
    name: String,
    family: AlgorithmFamily,
    security_level: SecurityLevel,
    enabled: bool,
}

impl AlgorithmDescriptor {
    pub fn new(
        name: impl Into<String>,
        family: AlgorithmFamily,
        security_level: SecurityLevel,
        enabled: bool,
    ) -> Self {
        Self {
            name: name.into(),
            family,
            security_level,
            enabled,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family(&self) -> AlgorithmFamily {
        self.family
    }

    pub fn security_level(&self) -> SecurityLevel {
        self.security_level
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
