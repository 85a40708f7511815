use crate::summary::Summary;
use pqbench_common::{BenchmarkReport, OperationResult};
use std::fmt::Write;
use std::time::Duration;

const RULE_WIDTH: usize = 80;

/// Per-operation listing, algorithms in the order they were benchmarked.
///
/// Every attempted operation gets its own block, failures included.
pub fn render(report: &BenchmarkReport) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);

    // Writing into a String cannot fail
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "BENCHMARK RESULTS");
    let _ = writeln!(out, "{}", rule);

    for entry in report.entries() {
        if entry.results.is_empty() {
            let _ = writeln!(out, "\n{}: No results available", entry.algorithm);
            continue;
        }

        let _ = writeln!(out, "\n{}:", entry.algorithm);
        for result in &entry.results {
            render_result(&mut out, result);
        }
    }
    out
}

fn render_result(out: &mut String, result: &OperationResult) {
    let status = if result.is_success() {
        "✓ SUCCESS"
    } else {
        "✗ FAILED"
    };
    let _ = writeln!(out, "  {}: {}", result.kind(), status);
    let _ = writeln!(
        out,
        "    Execution Time: {} seconds",
        seconds(result.duration())
    );

    if let Some(sizes) = result.sizes() {
        for (label, bytes) in sizes.fields() {
            let _ = writeln!(out, "    {}: {} bytes", label, bytes);
        }
    } else if let Some(err) = result.error() {
        let _ = writeln!(out, "    Error: {}", err);
    } else if let Some(reason) = result.failure() {
        let _ = writeln!(out, "    Reason: {}", reason);
    }
}

/// One table row per algorithm
pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<14} {:>8} {:>8} {:>8} {:>12} {:>12} {:>12} {:>12}",
        "ALGORITHM", "ATTEMPTS", "OK", "RATE", "MEAN", "MIN", "MAX", "P95"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH + 14));

    for alg in &summary.algorithms {
        let rate = if alg.attempts == 0 {
            "-".to_string()
        } else {
            format!("{:.0}%", alg.success_rate() * 100.0)
        };
        let (mean, min, max, p95) = match &alg.timing {
            Some(t) => (millis(t.mean), millis(t.min), millis(t.max), millis(t.p95)),
            None => Default::default(),
        };
        let _ = writeln!(
            out,
            "{:<14} {:>8} {:>8} {:>8} {:>12} {:>12} {:>12} {:>12}",
            alg.algorithm, alg.attempts, alg.successes, rate, mean, min, max, p95
        );
    }

    let _ = writeln!(
        out,
        "\n{} of {} operations succeeded",
        summary.total_successes(),
        summary.total_attempts()
    );
    out
}

fn seconds(d: Duration) -> String {
    format!("{:.6}", d.as_secs_f64())
}

fn millis(d: Duration) -> String {
    format!("{:.3} ms", d.as_secs_f64() * 1000.0)
}
