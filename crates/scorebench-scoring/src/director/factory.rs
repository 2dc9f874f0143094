//! Score director factories.
//!
//! A factory is built once per benchmark problem and hands out a fresh,
//! solution-less director for every iteration.

use std::marker::PhantomData;
use std::sync::Arc;

use scorebench_core::{PlanningSolution, SolutionDescriptor};

use super::easy::EasyScoreDirector;
use super::incremental::{IncrementalScoreCalculator, IncrementalScoreDirector};
use super::traits::ScoreDirector;

/// Options passed to [`ScoreDirectorFactory::build_score_director`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreDirectorFlags {
    /// Track per-constraint match totals alongside the score.
    pub constraint_match_enabled: bool,
}

impl ScoreDirectorFlags {
    pub fn with_constraint_match(mut self, enabled: bool) -> Self {
        self.constraint_match_enabled = enabled;
        self
    }
}

/// Builds score directors for one solution type.
pub trait ScoreDirectorFactory<S: PlanningSolution> {
    type Director: ScoreDirector<S>;

    /// Returns the structural descriptor shared by all built directors.
    fn solution_descriptor(&self) -> &SolutionDescriptor<S>;

    /// Builds a director without a working solution.
    fn build_score_director(&self, flags: ScoreDirectorFlags) -> Self::Director;
}

/// Builds [`EasyScoreDirector`]s sharing one calculator.
///
/// Constraint matching is not available for easy calculation; the flag is ignored.
pub struct EasyScoreDirectorFactory<S, C> {
    solution_descriptor: Arc<SolutionDescriptor<S>>,
    score_calculator: C,
}

impl<S, C> EasyScoreDirectorFactory<S, C>
where
    S: PlanningSolution,
    C: Fn(&S) -> S::Score + Clone + Send,
{
    pub fn new(solution_descriptor: SolutionDescriptor<S>, score_calculator: C) -> Self {
        Self {
            solution_descriptor: Arc::new(solution_descriptor),
            score_calculator,
        }
    }
}

impl<S, C> ScoreDirectorFactory<S> for EasyScoreDirectorFactory<S, C>
where
    S: PlanningSolution,
    C: Fn(&S) -> S::Score + Clone + Send,
{
    type Director = EasyScoreDirector<S, C>;

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        &self.solution_descriptor
    }

    fn build_score_director(&self, _flags: ScoreDirectorFlags) -> Self::Director {
        EasyScoreDirector::new(
            Arc::clone(&self.solution_descriptor),
            self.score_calculator.clone(),
        )
    }
}

/// Builds [`IncrementalScoreDirector`]s, each with a calculator of its own.
pub struct IncrementalScoreDirectorFactory<S, C, F> {
    solution_descriptor: Arc<SolutionDescriptor<S>>,
    calculator_factory: F,
    _phantom: PhantomData<fn() -> C>,
}

impl<S, C, F> IncrementalScoreDirectorFactory<S, C, F>
where
    S: PlanningSolution,
    C: IncrementalScoreCalculator<S>,
    F: Fn() -> C,
{
    pub fn new(solution_descriptor: SolutionDescriptor<S>, calculator_factory: F) -> Self {
        Self {
            solution_descriptor: Arc::new(solution_descriptor),
            calculator_factory,
            _phantom: PhantomData,
        }
    }
}

impl<S, C, F> ScoreDirectorFactory<S> for IncrementalScoreDirectorFactory<S, C, F>
where
    S: PlanningSolution,
    C: IncrementalScoreCalculator<S>,
    F: Fn() -> C,
{
    type Director = IncrementalScoreDirector<S, C>;

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        &self.solution_descriptor
    }

    fn build_score_director(&self, flags: ScoreDirectorFlags) -> Self::Director {
        IncrementalScoreDirector::new(
            Arc::clone(&self.solution_descriptor),
            (self.calculator_factory)(),
            flags.constraint_match_enabled,
        )
    }
}
