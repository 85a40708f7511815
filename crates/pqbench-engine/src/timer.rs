use std::time::{Duration, Instant};

/// Monotonic wall-clock stopwatch around the cryptographic calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timer {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Timer {
    /// A timer that has not started yet; stopping it yields zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start() -> Self {
        Self {
            start_time: Some(Instant::now()),
            elapsed: Duration::ZERO,
        }
    }

    pub fn start_now(&mut self) {
        self.start_time = Some(Instant::now());
        self.elapsed = Duration::ZERO;
    }

    /// Stops the timer if running and returns the elapsed time. Idempotent.
    pub fn stop(&mut self) -> Duration {
        if let Some(start) = self.start_time.take() {
            self.elapsed = start.elapsed();
        }
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }
}
