use crate::error::BenchError;
use crate::result::OperationResult;
use serde::{Deserialize, Serialize};

/// All attempts recorded for one algorithm name, in execution order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AlgorithmEntry {
    pub algorithm: String,
    pub results: Vec<OperationResult>,
}

impl AlgorithmEntry {
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            results: Vec::new(),
        }
    }

    pub fn successes(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }
}

/// Algorithm name -> results, kept in the order the algorithms were first benchmarked.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BenchmarkReport {
    entries: Vec<AlgorithmEntry>,
}

impl BenchmarkReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `algorithm`, creating an empty one at the end if needed
    pub fn entry(&mut self, algorithm: &str) -> &mut AlgorithmEntry {
        let idx = match self.entries.iter().position(|e| e.algorithm == algorithm) {
            Some(idx) => idx,
            None => {
                self.entries.push(AlgorithmEntry::new(algorithm));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx]
    }

    pub fn record(&mut self, result: OperationResult) {
        let algorithm = result.algorithm().to_string();
        self.entry(&algorithm).results.push(result);
    }

    pub fn get(&self, algorithm: &str) -> Option<&AlgorithmEntry> {
        self.entries.iter().find(|e| e.algorithm == algorithm)
    }

    pub fn entries(&self) -> &[AlgorithmEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_operations(&self) -> usize {
        self.entries.iter().map(|e| e.results.len()).sum()
    }

    /// Appends another report's results, keeping first-seen algorithm order
    pub fn merge(&mut self, other: BenchmarkReport) {
        for incoming in other.entries {
            self.entry(&incoming.algorithm).results.extend(incoming.results);
        }
    }

    pub fn to_json(&self) -> Result<String, BenchError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, BenchError> {
        let report: Self = serde_json::from_str(text)?;
        report.validate()?;
        Ok(report)
    }

    /// Serializes the report to compact binary format (Postcard)
    pub fn to_bytes(&self) -> Result<Vec<u8>, BenchError> {
        Ok(postcard::to_allocvec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BenchError> {
        let report: Self = postcard::from_bytes(bytes)?;
        report.validate()?;
        Ok(report)
    }

    fn validate(&self) -> Result<(), BenchError> {
        for entry in &self.entries {
            for result in &entry.results {
                if result.algorithm() != entry.algorithm {
                    return Err(BenchError::Serialization(format!(
                        "result for {} filed under {}",
                        result.algorithm(),
                        entry.algorithm
                    )));
                }
                if !result.is_consistent() {
                    return Err(BenchError::Serialization(format!(
                        "inconsistent {} result for {}",
                        result.kind(),
                        entry.algorithm
                    )));
                }
            }
        }
        Ok(())
    }
}
