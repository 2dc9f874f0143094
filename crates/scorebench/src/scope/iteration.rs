//! Iteration-level scope.

use std::time::{Duration, Instant};

use super::StepScope;

/// Scope for one benchmark iteration.
///
/// Counts steps and invocations; the benchmark problem turns the final
/// counts into an iteration summary.
#[derive(Debug, Clone)]
pub struct IterationScope {
    iteration_index: u64,
    seed: u64,
    step_count: u64,
    invocation_count: u64,
    kept_count: u64,
    undone_count: u64,
    start_time: Instant,
}

impl IterationScope {
    /// Creates a new iteration scope.
    pub fn new(iteration_index: u64, seed: u64) -> Self {
        Self {
            iteration_index,
            seed,
            step_count: 0,
            invocation_count: 0,
            kept_count: 0,
            undone_count: 0,
            start_time: Instant::now(),
        }
    }

    /// Returns the iteration index within the trial (0-based).
    pub fn iteration_index(&self) -> u64 {
        self.iteration_index
    }

    /// Returns the seed random streams are reset to at iteration start.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the number of closed steps.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn invocation_count(&self) -> u64 {
        self.invocation_count
    }

    pub fn kept_count(&self) -> u64 {
        self.kept_count
    }

    pub fn undone_count(&self) -> u64 {
        self.undone_count
    }

    /// Returns the elapsed time since the iteration started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Creates the scope of the next step.
    pub fn open_step(&self) -> StepScope {
        StepScope::new(self.iteration_index, self.step_count)
    }

    /// Records the outcome of one invocation.
    pub fn record_invocation(&mut self, kept: bool) {
        self.invocation_count += 1;
        if kept {
            self.kept_count += 1;
        } else {
            self.undone_count += 1;
        }
    }

    /// Counts a closed step.
    pub fn complete_step(&mut self, step: &StepScope) {
        debug_assert_eq!(step.step_index(), self.step_count);
        self.step_count += 1;
    }
}
