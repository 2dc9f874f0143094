//! Move trait definition.

use std::fmt::Debug;

use scorebench_core::PlanningSolution;
use scorebench_scoring::ScoreDirector;

/// A reversible change of the working solution.
///
/// Moves are immutable. Applying one through [`Move::do_move`] yields the move
/// that restores the previous state, so undo never needs a recording
/// director.
///
/// Methods are generic over `D` so the benchmark problem can use its concrete
/// director type without virtual dispatch.
pub trait Move<S: PlanningSolution>: Send + Debug {
    /// The move returned by `do_move`, restoring the state before it.
    type Undo: Move<S>;

    /// Returns true if this move can be executed in the current state.
    ///
    /// A move is not doable if:
    /// - The destination value equals the current value (no change)
    /// - The entity is pinned
    /// - The destination value lies outside the variable's value range
    fn is_doable<D: ScoreDirector<S>>(&self, score_director: &D) -> bool;

    /// Executes this move through the score director and returns its inverse.
    ///
    /// Variable changes are bracketed by before/after notifications and
    /// followed by `trigger_variable_listeners`.
    fn do_move<D: ScoreDirector<S>>(&self, score_director: &mut D) -> Self::Undo;

    /// Returns the descriptor index of the entity type this move affects.
    fn descriptor_index(&self) -> usize;

    /// Returns the entity index this move affects.
    fn entity_index(&self) -> usize;

    /// Returns the variable name this move affects.
    fn variable_name(&self) -> &'static str;
}
