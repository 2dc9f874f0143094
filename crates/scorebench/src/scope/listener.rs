//! Lifecycle listener trait.

use super::{IterationScope, StepScope};

/// Observes the trial, iteration and step transitions of a benchmark problem.
///
/// All methods default to no-ops. Calls are strictly nested:
/// `trial_started` < `iteration_started` < `step_started` < `step_ended`
/// < `iteration_ended` < `trial_ended`, and steps never overlap.
pub trait LifecycleListener {
    fn trial_started(&mut self) {}

    /// The working solution has been freshly cloned and fully scored.
    fn iteration_started(&mut self, _iteration_scope: &IterationScope) {}

    fn step_started(&mut self, _step_scope: &StepScope) {}

    fn step_ended(&mut self, _step_scope: &StepScope) {}

    /// The score director of the iteration is already closed.
    fn iteration_ended(&mut self, _iteration_scope: &IterationScope) {}

    fn trial_ended(&mut self) {}
}
