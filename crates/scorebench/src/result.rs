//! Benchmark result types.

use std::time::Duration;

use scorebench_config::{Example, ScoreDirectorType};

use crate::problem::IterationSummary;

/// Measurement of one iteration of one fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationMeasurement {
    /// Fork index (0-based).
    pub fork_index: usize,
    /// Iteration index within the fork's trial, warmup included.
    pub iteration_index: u64,
    /// Warmup iterations are recorded but not aggregated.
    pub warmup: bool,
    /// Time spent inside `run_invocation` only.
    pub measured_time: Duration,
    pub invocations: u64,
    pub steps: u64,
    pub kept: u64,
    pub undone: u64,
    pub score_calculations: u64,
}

impl IterationMeasurement {
    /// Creates a measurement from an iteration summary and the measured time.
    pub fn from_summary(
        fork_index: usize,
        warmup: bool,
        summary: &IterationSummary,
        measured_time: Duration,
    ) -> Self {
        Self {
            fork_index,
            iteration_index: summary.iteration_index,
            warmup,
            measured_time,
            invocations: summary.invocations,
            steps: summary.steps,
            kept: summary.kept,
            undone: summary.undone,
            score_calculations: summary.score_calculations,
        }
    }

    /// Returns invocations per second of measured time.
    ///
    /// # Example
    ///
    /// ```
    /// use scorebench::IterationMeasurement;
    /// use std::time::Duration;
    ///
    /// let measurement = IterationMeasurement {
    ///     fork_index: 0,
    ///     iteration_index: 0,
    ///     warmup: false,
    ///     measured_time: Duration::from_millis(500),
    ///     invocations: 1000,
    ///     steps: 100,
    ///     kept: 100,
    ///     undone: 900,
    ///     score_calculations: 1001,
    /// };
    ///
    /// assert!((measurement.invocations_per_second() - 2000.0).abs() < 0.001);
    /// ```
    pub fn invocations_per_second(&self) -> f64 {
        if self.measured_time.is_zero() {
            0.0
        } else {
            self.invocations as f64 / self.measured_time.as_secs_f64()
        }
    }
}

/// All iterations of one (example, score director type) pair, across forks.
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub example: Example,
    pub score_director_type: ScoreDirectorType,
    pub iterations: Vec<IterationMeasurement>,
}

impl BenchmarkResult {
    /// Creates a new empty result.
    pub fn new(example: Example, score_director_type: ScoreDirectorType) -> Self {
        Self {
            example,
            score_director_type,
            iterations: Vec::new(),
        }
    }

    /// Adds an iteration to the results.
    pub fn add_iteration(&mut self, measurement: IterationMeasurement) {
        self.iterations.push(measurement);
    }

    /// Returns the non-warmup iterations.
    pub fn measurements(&self) -> impl Iterator<Item = &IterationMeasurement> {
        self.iterations.iter().filter(|m| !m.warmup)
    }

    /// Returns the number of non-warmup iterations.
    pub fn measurement_count(&self) -> usize {
        self.measurements().count()
    }

    /// Returns the invocations of all non-warmup iterations.
    pub fn total_invocations(&self) -> u64 {
        self.measurements().map(|m| m.invocations).sum()
    }

    /// Returns the mean invocations per second over non-warmup iterations.
    pub fn mean_invocations_per_second(&self) -> f64 {
        let count = self.measurement_count();
        if count == 0 {
            return 0.0;
        }
        let total: f64 = self.measurements().map(|m| m.invocations_per_second()).sum();
        total / count as f64
    }
}
