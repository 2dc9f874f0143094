//! Built-in benchmark examples.
//!
//! Each example generates its instance in memory from the configured seed
//! and provides a full and an incremental score calculator. Examination has
//! shadow variables, so its directors are wrapped to run variable listeners.

pub mod examination;
pub mod nqueens;


use scorebench_config::{BenchmarkConfig, Example, ScoreDirectorType};
use scorebench_core::PlanningSolution;
use scorebench_scoring::{
    EasyScoreDirectorFactory, IncrementalScoreDirectorFactory, ScoreDirectorFactory,
    ScoreDirectorFlags, ShadowAwareScoreDirectorFactory,
};

use crate::error::{BenchmarkError, Result};
use crate::problem::{BenchmarkProblem, Problem};

/// Builds the benchmark problem of one fork of an (example, score director type) pair.
///
/// The instance is generated from the base seed, so every fork benchmarks the
/// same instance; move sampling and undo decisions use the fork's seed.
///
/// # Errors
///
/// - `Config` if the configuration is invalid
/// - `UnsupportedCombination` if the example cannot be scored by the type
pub fn create_problem(
    example: Example,
    score_director_type: ScoreDirectorType,
    config: &BenchmarkConfig,
    fork_index: usize,
) -> Result<Box<dyn Problem>> {
    config.validate()?;
    if !example.is_supported_on(score_director_type) {
        return Err(BenchmarkError::UnsupportedCombination {
            example,
            score_director_type,
        });
    }

    let name = format!("{example}/{score_director_type}");
    let flags = ScoreDirectorFlags::default()
        .with_constraint_match(score_director_type.is_constraint_match_enabled());
    let seed = config.fork_seed(fork_index);

    match (example, score_director_type) {
        (Example::NQueens, ScoreDirectorType::Easy) => configure(
            BenchmarkProblem::new(
                name,
                EasyScoreDirectorFactory::new(nqueens::create_descriptor(), nqueens::calculate_score),
                nqueens::generate(config.nqueens.n, config.random_seed),
            ),
            config,
            flags,
            seed,
        ),
        (Example::NQueens, _) => configure(
            BenchmarkProblem::new(
                name,
                IncrementalScoreDirectorFactory::new(
                    nqueens::create_descriptor(),
                    nqueens::NQueensIncrementalCalculator::default,
                ),
                nqueens::generate(config.nqueens.n, config.random_seed),
            ),
            config,
            flags,
            seed,
        ),
        (Example::Examination, ScoreDirectorType::Easy) => configure(
            BenchmarkProblem::new(
                name,
                ShadowAwareScoreDirectorFactory::new(EasyScoreDirectorFactory::new(
                    examination::create_descriptor(),
                    examination::calculate_score,
                )),
                examination::generate(&config.examination, config.random_seed),
            ),
            config,
            flags,
            seed,
        ),
        (Example::Examination, _) => configure(
            BenchmarkProblem::new(
                name,
                ShadowAwareScoreDirectorFactory::new(IncrementalScoreDirectorFactory::new(
                    examination::create_descriptor(),
                    examination::ExaminationIncrementalCalculator::default,
                )),
                examination::generate(&config.examination, config.random_seed),
            ),
            config,
            flags,
            seed,
        ),
    }
}

fn configure<S, F>(
    problem: BenchmarkProblem<S, F>,
    config: &BenchmarkConfig,
    flags: ScoreDirectorFlags,
    seed: u64,
) -> Result<Box<dyn Problem>>
where
    S: PlanningSolution,
    F: ScoreDirectorFactory<S> + 'static,
{
    let problem = problem
        .with_flags(flags)
        .with_seed(seed)
        .with_move_probe_limit(config.move_probe_limit)
        .with_undo_probability(config.undo_probability)?;
    Ok(Box::new(problem))
}
