//! Run progress reporting.
//!
//! The pipeline executes a fixed sequence of stages, so the total is known
//! up front and every stage logs its position as `[n/total]` plus a
//! percentage. The reporter is a plain value handed down the call chain;
//! there is no global state.

/// Sequential stage announcer for a collection run.
pub struct ProgressReporter {
    total: usize,
    current: usize,
}

impl ProgressReporter {
    /// Create a reporter for a run with `total` stages.
    pub fn new(total: usize) -> Self {
        Self { total, current: 0 }
    }

    /// Announce the next stage. Stages are numbered from 1.
    pub fn step(&mut self, label: &str) {
        self.current += 1;
        let pct = if self.total == 0 {
            100
        } else {
            (self.current * 100) / self.total
        };
        tracing::info!("[{}/{}] ({pct}%) {label}", self.current, self.total);
    }

    /// Number of stages announced so far.
    pub fn completed(&self) -> usize {
        self.current
    }
}
