//! Benchmark runner.

use std::time::{Duration, Instant};

use tracing::info;

use scorebench_config::{BenchmarkConfig, Example, ScoreDirectorType};

use crate::blackhole::Blackhole;
use crate::error::Result;
use crate::example::create_problem;
use crate::problem::Problem;
use crate::result::{BenchmarkResult, IterationMeasurement};

/// Sequential, in-process benchmark runner.
///
/// For every enabled score director type and every enabled example it
/// supports, the runner executes each fork as one trial of warmup and
/// measurement iterations. Only `run_invocation` is timed.
pub struct Benchmark {
    config: BenchmarkConfig,
}

impl Benchmark {
    /// Creates a runner after validating `config`.
    ///
    /// # Errors
    ///
    /// `Config` if the configuration is invalid.
    pub fn new(config: BenchmarkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Runs every supported combination and returns one result per combination.
    ///
    /// Unsupported combinations are skipped.
    pub fn run(&self) -> Result<Vec<BenchmarkResult>> {
        let mut results = Vec::new();
        for &score_director_type in &self.config.enabled_score_director_types {
            for example in self.config.supported_examples(score_director_type) {
                results.push(self.run_combination(example, score_director_type)?);
            }
        }
        Ok(results)
    }

    /// Runs all forks of one (example, score director type) pair.
    ///
    /// # Errors
    ///
    /// `UnsupportedCombination`, `NoSelectableMoves` or `MoveExhaustion`.
    pub fn run_combination(
        &self,
        example: Example,
        score_director_type: ScoreDirectorType,
    ) -> Result<BenchmarkResult> {
        info!(
            event = "benchmark_start",
            example = %example,
            score_director_type = %score_director_type,
            forks = self.config.forks,
        );

        let mut result = BenchmarkResult::new(example, score_director_type);
        for fork_index in 0..self.config.forks {
            let mut problem = create_problem(example, score_director_type, &self.config, fork_index)?;
            self.run_fork(fork_index, problem.as_mut(), &mut result)?;
        }

        info!(
            event = "benchmark_end",
            example = %example,
            score_director_type = %score_director_type,
            iterations = result.measurement_count(),
            invocations = result.total_invocations(),
            speed = result.mean_invocations_per_second() as u64,
        );
        Ok(result)
    }

    // One trial. The trial is torn down even if an iteration fails.
    fn run_fork(
        &self,
        fork_index: usize,
        problem: &mut dyn Problem,
        result: &mut BenchmarkResult,
    ) -> Result<()> {
        problem.setup_trial()?;

        let warmup = self.config.warmup_iterations;
        for i in 0..warmup + self.config.measurement_iterations {
            match self.run_iteration(fork_index, i < warmup, problem) {
                Ok(measurement) => result.add_iteration(measurement),
                Err(e) => {
                    problem.tear_down_trial();
                    return Err(e);
                }
            }
        }

        problem.tear_down_trial();
        Ok(())
    }

    fn run_iteration(
        &self,
        fork_index: usize,
        warmup: bool,
        problem: &mut dyn Problem,
    ) -> Result<IterationMeasurement> {
        problem.setup_iteration();

        let time_limit = self.config.iteration_time_limit();
        let start = Instant::now();
        let mut blackhole = Blackhole::new();
        let mut measured_time = Duration::ZERO;

        for _ in 0..self.config.invocations_per_iteration {
            if time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                break;
            }
            if let Err(e) = problem.setup_invocation() {
                problem.tear_down_iteration();
                return Err(e);
            }
            let invocation_start = Instant::now();
            problem.run_invocation(&mut blackhole);
            measured_time += invocation_start.elapsed();
            problem.tear_down_invocation();
        }

        let summary = problem.tear_down_iteration();
        Ok(IterationMeasurement::from_summary(
            fork_index,
            warmup,
            &summary,
            measured_time,
        ))
    }
}
