//! Scope hierarchy for the simulated local search.
//!
//! Scopes are created and closed by the benchmark problem:
//! - `IterationScope`: one fresh working solution, from `setup_iteration`
//!   to `tear_down_iteration`
//! - `StepScope`: the invocations between two kept moves
//!
//! A step scope exists only inside an iteration scope, and at most one is
//! open at a time. [`LifecycleListener`]s observe every transition.

mod iteration;
mod listener;
mod step;


pub use iteration::IterationScope;
pub use listener::LifecycleListener;
pub use step::StepScope;
