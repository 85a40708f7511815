use pqbench_common::{BenchmarkReport, OperationResult, SizeMetrics};
use serde::Serialize;
use std::time::Duration;

/// Latency distribution over a set of attempts
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct TimingStats {
    pub count: usize,
    pub mean: Duration,
    pub min: Duration,
    pub max: Duration,
    pub median: Duration,
    pub p95: Duration,
}

impl TimingStats {
    /// `None` for an empty sample
    pub fn from_samples(samples: &[Duration]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted: Vec<u128> = samples.iter().map(Duration::as_nanos).collect();
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u128 = sorted.iter().sum();
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2
        } else {
            sorted[count / 2]
        };

        Some(Self {
            count,
            mean: nanos(sum / count as u128),
            min: nanos(sorted[0]),
            max: nanos(sorted[count - 1]),
            median: nanos(median),
            p95: nanos(percentile(&sorted, 95.0)),
        })
    }
}

fn nanos(n: u128) -> Duration {
    Duration::from_nanos(u64::try_from(n).unwrap_or(u64::MAX))
}

fn percentile(sorted: &[u128], pct: f64) -> u128 {
    let idx = ((pct / 100.0) * (sorted.len() - 1) as f64) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AlgorithmSummary {
    pub algorithm: String,
    pub attempts: usize,
    pub successes: usize,
    /// Over successful attempts only
    pub timing: Option<TimingStats>,
    /// Sizes of the most recent successful attempt
    pub last_sizes: Option<SizeMetrics>,
}

impl AlgorithmSummary {
    fn from_results(algorithm: &str, results: &[OperationResult]) -> Self {
        let durations: Vec<Duration> = results
            .iter()
            .filter(|r| r.is_success())
            .map(OperationResult::duration)
            .collect();

        Self {
            algorithm: algorithm.to_string(),
            attempts: results.len(),
            successes: durations.len(),
            timing: TimingStats::from_samples(&durations),
            last_sizes: results.iter().rev().find_map(|r| r.sizes().copied()),
        }
    }

    /// 0.0 when nothing was attempted
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.successes as f64 / self.attempts as f64
        }
    }

    pub fn failures(&self) -> usize {
        self.attempts - self.successes
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Summary {
    pub algorithms: Vec<AlgorithmSummary>,
}

impl Summary {
    pub fn total_attempts(&self) -> usize {
        self.algorithms.iter().map(|a| a.attempts).sum()
    }

    pub fn total_successes(&self) -> usize {
        self.algorithms.iter().map(|a| a.successes).sum()
    }

    pub fn get(&self, algorithm: &str) -> Option<&AlgorithmSummary> {
        self.algorithms.iter().find(|a| a.algorithm == algorithm)
    }
}

/// Read-only projection of a report, one row per algorithm in benchmark order
pub fn summarize(report: &BenchmarkReport) -> Summary {
    Summary {
        algorithms: report
            .entries()
            .iter()
            .map(|entry| AlgorithmSummary::from_results(&entry.algorithm, &entry.results))
            .collect(),
    }
}
