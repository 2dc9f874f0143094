// Score director trait definition.

use scorebench_core::{PlanningSolution, Score, SolutionDescriptor};

// Per-constraint totals reported by a director with constraint matching enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintMatchTotal<Sc: Score> {
    pub constraint_name: &'static str,
    pub match_count: usize,
    pub score: Sc,
}

impl<Sc: Score> ConstraintMatchTotal<Sc> {
    pub fn new(constraint_name: &'static str, match_count: usize, score: Sc) -> Self {
        Self {
            constraint_name,
            match_count,
            score,
        }
    }
}

// The score director owns the working solution of one iteration and scores it.
//
// It is responsible for:
// - Holding the working solution handed to it by `set_working_solution`
// - Receiving variable change notifications from moves
// - Calculating scores (incrementally when possible)
// - Releasing its state on `close`
//
// Calls after `close` are contract violations and panic.
pub trait ScoreDirector<S: PlanningSolution>: Send {
    // Replaces the working solution and resets any incremental state.
    fn set_working_solution(&mut self, solution: S);

    // Returns a reference to the working solution.
    fn working_solution(&self) -> &S;

    // Returns a mutable reference to the working solution.
    //
    // Callers must bracket writes with before/after variable notifications.
    fn working_solution_mut(&mut self) -> &mut S;

    // Produces an independent copy of `solution`, suitable as a working solution.
    fn clone_solution(&self, solution: &S) -> S {
        solution.clone()
    }

    // Returns the structural descriptor of the solution type.
    fn solution_descriptor(&self) -> &SolutionDescriptor<S>;

    // Called before a planning variable is changed.
    fn before_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &str,
    );

    // Called after a planning variable is changed.
    fn after_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &str,
    );

    // Brings derived (shadow) state in line with the genuine variables.
    fn trigger_variable_listeners(&mut self);

    // Calculates and returns the current score, storing it on the working solution.
    fn calculate_score(&mut self) -> S::Score;

    // Returns how many score calculations this director has performed.
    fn calculation_count(&self) -> u64;

    // Returns true if this director updates the score incrementally.
    fn is_incremental(&self) -> bool {
        false
    }

    // Returns per-constraint totals when constraint matching is enabled.
    fn constraint_match_totals(&self) -> Option<Vec<ConstraintMatchTotal<S::Score>>> {
        None
    }

    // Releases the working solution and all incremental state.
    fn close(&mut self);

    // Returns true once `close` has been called.
    fn is_closed(&self) -> bool;
}
