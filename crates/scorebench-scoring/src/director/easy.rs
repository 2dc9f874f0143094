//! Easy score director with full recalculation.

use std::sync::Arc;

use scorebench_core::{PlanningSolution, SolutionDescriptor};

use super::traits::ScoreDirector;

/// A score director that recalculates the full score each time (zero-erasure).
///
/// The calculator is stored as a concrete generic type parameter, not as `Arc<dyn Fn>`.
/// Every recalculation after a change walks the whole solution, which makes
/// this the baseline every incremental engine is benchmarked against.
pub struct EasyScoreDirector<S: PlanningSolution, C> {
    working_solution: Option<S>,
    solution_descriptor: Arc<SolutionDescriptor<S>>,
    score_calculator: C,
    score_dirty: bool,
    cached_score: Option<S::Score>,
    calculation_count: u64,
    closed: bool,
}

impl<S, C> EasyScoreDirector<S, C>
where
    S: PlanningSolution,
    C: Fn(&S) -> S::Score + Send,
{
    /// Creates a director without a working solution.
    pub fn new(solution_descriptor: Arc<SolutionDescriptor<S>>, score_calculator: C) -> Self {
        Self {
            working_solution: None,
            solution_descriptor,
            score_calculator,
            score_dirty: true,
            cached_score: None,
            calculation_count: 0,
            closed: false,
        }
    }

    fn mark_dirty(&mut self) {
        self.score_dirty = true;
    }

    fn solution(&self) -> &S {
        assert!(!self.closed, "EasyScoreDirector used after close()");
        match &self.working_solution {
            Some(solution) => solution,
            None => panic!("EasyScoreDirector has no working solution; call set_working_solution() first"),
        }
    }

    fn solution_mut(&mut self) -> &mut S {
        assert!(!self.closed, "EasyScoreDirector used after close()");
        match &mut self.working_solution {
            Some(solution) => solution,
            None => panic!("EasyScoreDirector has no working solution; call set_working_solution() first"),
        }
    }
}

impl<S, C> ScoreDirector<S> for EasyScoreDirector<S, C>
where
    S: PlanningSolution,
    C: Fn(&S) -> S::Score + Send,
{
    fn set_working_solution(&mut self, solution: S) {
        assert!(!self.closed, "EasyScoreDirector used after close()");
        self.working_solution = Some(solution);
        self.cached_score = None;
        self.mark_dirty();
    }

    fn working_solution(&self) -> &S {
        self.solution()
    }

    fn working_solution_mut(&mut self) -> &mut S {
        self.mark_dirty();
        self.solution_mut()
    }

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        &self.solution_descriptor
    }

    fn before_variable_changed(
        &mut self,
        _descriptor_index: usize,
        _entity_index: usize,
        _variable_name: &str,
    ) {
        self.mark_dirty();
    }

    fn after_variable_changed(
        &mut self,
        _descriptor_index: usize,
        _entity_index: usize,
        _variable_name: &str,
    ) {
        // Already marked dirty in before_variable_changed
    }

    fn trigger_variable_listeners(&mut self) {
        // No shadow variables to update
    }

    fn calculate_score(&mut self) -> S::Score {
        if !self.score_dirty {
            if let Some(score) = self.cached_score {
                return score;
            }
        }

        let score = (self.score_calculator)(self.solution());
        self.solution_mut().set_score(Some(score));
        self.cached_score = Some(score);
        self.score_dirty = false;
        self.calculation_count += 1;
        score
    }

    fn calculation_count(&self) -> u64 {
        self.calculation_count
    }

    fn close(&mut self) {
        self.working_solution = None;
        self.cached_score = None;
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
