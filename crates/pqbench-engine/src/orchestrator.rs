use crate::config::BenchConfig;
use crate::runner::OperationRunner;
use pqbench_common::{
    AlgorithmFamily, BenchError, BenchmarkReport, FailureReason, OperationKind, OperationResult,
};
use pqbench_provider::CryptoProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// The operations planned for one configured algorithm name.
#[derive(Debug, Clone)]
struct Plan {
    algorithm: String,
    kinds: Vec<OperationKind>,
}

/// Drives the runner over a configured algorithm list and collects a [`BenchmarkReport`].
pub struct Orchestrator {
    provider: Arc<dyn CryptoProvider>,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn CryptoProvider>) -> Self {
        Self { provider }
    }

    /// Benchmarks every configured algorithm once per applicable operation kind.
    ///
    /// Only an invalid configuration is an error; everything that goes wrong inside an
    /// operation is recorded in the report instead.
    pub async fn run(&self, config: &BenchConfig) -> Result<BenchmarkReport, BenchError> {
        config.validate()?;

        let runner = OperationRunner::new(self.provider.clone(), config.message.as_bytes());
        let plans: Vec<Plan> = config
            .algorithms
            .iter()
            .map(|name| self.plan(name, config))
            .collect();

        let report = if config.parallel {
            run_parallel(runner, plans, config.timeout(), config.workers).await
        } else {
            run_sequential(&runner, plans, config.timeout()).await
        };

        info!(
            "Benchmark complete: {} algorithms, {} operations",
            report.len(),
            report.total_operations()
        );
        Ok(report)
    }

    /// Works out which requested kinds apply. Mismatches are skipped, not failed.
    fn plan(&self, name: &str, config: &BenchConfig) -> Plan {
        let kinds = match self.provider.resolve(name) {
            None => {
                warn!("Skipping {}: not offered by {}", name, self.provider.name());
                Vec::new()
            }
            Some(desc) if !desc.is_enabled() => {
                warn!("Skipping {}: disabled in {}", name, self.provider.name());
                Vec::new()
            }
            Some(desc) => {
                let kinds: Vec<_> = config
                    .operations
                    .kinds()
                    .into_iter()
                    .filter(|kind| kind.family() == desc.family())
                    .collect();
                if kinds.is_empty() {
                    let wanted = match desc.family() {
                        AlgorithmFamily::Kem => "kem",
                        AlgorithmFamily::Signature => "sig",
                    };
                    debug!(
                        "Skipping {}: {} only, filter is '{}'",
                        name, wanted, config.operations
                    );
                }
                kinds
            }
        };

        Plan {
            algorithm: name.to_string(),
            kinds,
        }
    }
}

async fn run_sequential(
    runner: &OperationRunner,
    plans: Vec<Plan>,
    timeout: Option<Duration>,
) -> BenchmarkReport {
    let mut report = BenchmarkReport::new();
    for plan in plans {
        info!("Benchmarking {}...", plan.algorithm);
        let results = run_plan(runner.clone(), &plan, timeout).await;
        report.entry(&plan.algorithm).results.extend(results);
    }
    report
}

/// One task per algorithm, at most `workers` at a time. Results are merged afterwards in
/// configured order, so the report never sees concurrent writes.
async fn run_parallel(
    runner: OperationRunner,
    plans: Vec<Plan>,
    timeout: Option<Duration>,
    workers: usize,
) -> BenchmarkReport {
    let permits = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();

    for (idx, plan) in plans.iter().cloned().enumerate() {
        let runner = runner.clone();
        let permits = permits.clone();
        tasks.spawn(async move {
            // The semaphore is never closed
            let _permit = permits.acquire_owned().await.ok();
            info!("Benchmarking {}...", plan.algorithm);
            (idx, run_plan(runner, &plan, timeout).await)
        });
    }

    let mut collected: Vec<Option<Vec<OperationResult>>> = vec![None; plans.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, results)) => collected[idx] = Some(results),
            Err(e) => error!("Benchmark worker aborted: {}", e),
        }
    }

    let mut report = BenchmarkReport::new();
    for (plan, results) in plans.iter().zip(collected) {
        let results = results.unwrap_or_else(|| {
            // The worker died before reporting; keep one line per planned operation
            plan.kinds
                .iter()
                .map(|&kind| {
                    OperationResult::failed(
                        &plan.algorithm,
                        kind,
                        Duration::ZERO,
                        FailureReason::Panicked,
                        "benchmark worker aborted",
                    )
                })
                .collect()
        });
        report.entry(&plan.algorithm).results.extend(results);
    }
    report
}

async fn run_plan(
    runner: OperationRunner,
    plan: &Plan,
    timeout: Option<Duration>,
) -> Vec<OperationResult> {
    let mut results = Vec::with_capacity(plan.kinds.len());
    for &kind in &plan.kinds {
        results.push(execute(runner.clone(), kind, &plan.algorithm, timeout).await);
    }
    results
}

/// Runs one operation on the blocking pool, bounded by `timeout` when set.
///
/// On timeout the blocking task is abandoned, not killed: it still owns its sessions and
/// drops them when the provider call returns.
async fn execute(
    runner: OperationRunner,
    kind: OperationKind,
    algorithm: &str,
    timeout: Option<Duration>,
) -> OperationResult {
    let name = algorithm.to_string();
    let task = tokio::task::spawn_blocking(move || runner.run(kind, &name));

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!("{} {} exceeded {:?}", algorithm, kind, limit);
                return OperationResult::from_error(
                    algorithm,
                    kind,
                    limit,
                    &BenchError::Timeout(limit),
                );
            }
        },
        None => task.await,
    };

    joined.unwrap_or_else(|e| {
        error!("{} {} task failed: {}", algorithm, kind, e);
        OperationResult::failed(
            algorithm,
            kind,
            Duration::ZERO,
            FailureReason::Panicked,
            e.to_string(),
        )
    })
}
