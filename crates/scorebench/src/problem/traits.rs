//! Object-safe lifecycle surface of a benchmark problem.

use std::time::Duration;

use crate::blackhole::Blackhole;
use crate::error::Result;

/// Lifecycle state of a benchmark problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// No trial is active.
    Idle,

    /// Between `setup_trial` and `tear_down_trial`, outside any iteration.
    TrialActive,

    /// Between `setup_iteration` and `tear_down_iteration`.
    IterationActive,
}

/// Whether an invocation kept or undid its move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationKind {
    Kept,
    Undone,
}

/// Counters of one finished iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationSummary {
    pub iteration_index: u64,
    pub invocations: u64,
    /// Closed steps, including a force-closed final step.
    pub steps: u64,
    pub kept: u64,
    pub undone: u64,
    /// True if the last invocation undid its move and left its step open.
    pub final_step_force_closed: bool,
    pub score_calculations: u64,
    pub duration: Duration,
}

/// The lifecycle hooks of a benchmark problem, independent of its solution type.
///
/// Hooks must be called in the nesting order shown in the module docs.
/// Out-of-order calls are contract violations and panic.
pub trait Problem {
    /// Returns the problem name, e.g. `nqueens/incremental`.
    fn name(&self) -> &str;

    fn phase(&self) -> LifecyclePhase;

    /// Builds the move sampler.
    ///
    /// # Errors
    ///
    /// `NoSelectableMoves` if the solution declares no genuine variable.
    fn setup_trial(&mut self) -> Result<()>;

    /// Clones the original solution into a fresh score director and scores it.
    fn setup_iteration(&mut self);

    /// Prepares the next invocation outside the measured region.
    ///
    /// # Errors
    ///
    /// `MoveExhaustion` if no doable move was found within the probe budget.
    fn setup_invocation(&mut self) -> Result<()>;

    /// Runs the measured part of the invocation and feeds its result to `blackhole`.
    fn run_invocation(&mut self, blackhole: &mut Blackhole) -> InvocationKind;

    fn tear_down_invocation(&mut self);

    /// Releases the iteration's score director and reports its counters.
    fn tear_down_iteration(&mut self) -> IterationSummary;

    fn tear_down_trial(&mut self);
}
