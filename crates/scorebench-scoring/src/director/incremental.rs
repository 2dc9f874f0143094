//! Incremental score director driven by a user-supplied calculator.

use std::sync::Arc;

use scorebench_core::{PlanningSolution, SolutionDescriptor};

use super::traits::{ConstraintMatchTotal, ScoreDirector};

/// Maintains a score by retracting and re-inserting changed entities.
///
/// The director forwards every variable change notification together with
/// the working solution, so the calculator can read the old value in
/// `before_variable_changed` and the new one in `after_variable_changed`.
pub trait IncrementalScoreCalculator<S: PlanningSolution>: Send {
    /// Rebuilds all internal state from scratch for `solution`.
    fn reset_working_solution(&mut self, solution: &S, constraint_match_enabled: bool);

    /// Retracts the contribution of the entity about to change.
    fn before_variable_changed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &str,
    );

    /// Inserts the contribution of the entity that just changed.
    fn after_variable_changed(
        &mut self,
        solution: &S,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &str,
    );

    /// Returns the score of the current state.
    fn calculate_score(&mut self) -> S::Score;

    /// Returns per-constraint totals; empty unless constraint matching is enabled.
    fn constraint_match_totals(&self) -> Vec<ConstraintMatchTotal<S::Score>> {
        Vec::new()
    }
}

/// A score director that delegates to an [`IncrementalScoreCalculator`].
pub struct IncrementalScoreDirector<S: PlanningSolution, C> {
    working_solution: Option<S>,
    solution_descriptor: Arc<SolutionDescriptor<S>>,
    calculator: C,
    constraint_match_enabled: bool,
    calculation_count: u64,
    closed: bool,
}

impl<S, C> IncrementalScoreDirector<S, C>
where
    S: PlanningSolution,
    C: IncrementalScoreCalculator<S>,
{
    /// Creates a director without a working solution.
    pub fn new(
        solution_descriptor: Arc<SolutionDescriptor<S>>,
        calculator: C,
        constraint_match_enabled: bool,
    ) -> Self {
        Self {
            working_solution: None,
            solution_descriptor,
            calculator,
            constraint_match_enabled,
            calculation_count: 0,
            closed: false,
        }
    }

    pub fn is_constraint_match_enabled(&self) -> bool {
        self.constraint_match_enabled
    }

    fn solution(&self) -> &S {
        assert!(!self.closed, "IncrementalScoreDirector used after close()");
        match &self.working_solution {
            Some(solution) => solution,
            None => panic!(
                "IncrementalScoreDirector has no working solution; call set_working_solution() first"
            ),
        }
    }
}

impl<S, C> ScoreDirector<S> for IncrementalScoreDirector<S, C>
where
    S: PlanningSolution,
    C: IncrementalScoreCalculator<S>,
{
    fn set_working_solution(&mut self, solution: S) {
        assert!(!self.closed, "IncrementalScoreDirector used after close()");
        self.calculator
            .reset_working_solution(&solution, self.constraint_match_enabled);
        self.working_solution = Some(solution);
    }

    fn working_solution(&self) -> &S {
        self.solution()
    }

    fn working_solution_mut(&mut self) -> &mut S {
        assert!(!self.closed, "IncrementalScoreDirector used after close()");
        match &mut self.working_solution {
            Some(solution) => solution,
            None => panic!(
                "IncrementalScoreDirector has no working solution; call set_working_solution() first"
            ),
        }
    }

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        &self.solution_descriptor
    }

    fn before_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &str,
    ) {
        let Some(solution) = self.working_solution.as_ref() else {
            panic!("IncrementalScoreDirector notified of a change without a working solution");
        };
        self.calculator
            .before_variable_changed(solution, descriptor_index, entity_index, variable_name);
    }

    fn after_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &str,
    ) {
        let Some(solution) = self.working_solution.as_ref() else {
            panic!("IncrementalScoreDirector notified of a change without a working solution");
        };
        self.calculator
            .after_variable_changed(solution, descriptor_index, entity_index, variable_name);
    }

    fn trigger_variable_listeners(&mut self) {
        // No shadow variables to update
    }

    fn calculate_score(&mut self) -> S::Score {
        let score = self.calculator.calculate_score();
        self.working_solution_mut().set_score(Some(score));
        self.calculation_count += 1;
        score
    }

    fn calculation_count(&self) -> u64 {
        self.calculation_count
    }

    fn is_incremental(&self) -> bool {
        true
    }

    fn constraint_match_totals(&self) -> Option<Vec<ConstraintMatchTotal<S::Score>>> {
        if self.constraint_match_enabled && !self.closed {
            Some(self.calculator.constraint_match_totals())
        } else {
            None
        }
    }

    fn close(&mut self) {
        self.working_solution = None;
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
