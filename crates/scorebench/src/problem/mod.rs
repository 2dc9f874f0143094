//! The benchmark problem: a simulated local search driven one invocation at a time.
//!
//! A measurement harness drives a problem through four nested levels:
//!
//! ```text
//! setup_trial
//!   setup_iteration                 fresh clone of the original solution
//!     setup_invocation              open a step, decide keep/undo, pick a move
//!       run_invocation              measured: do move, score, maybe undo
//!     tear_down_invocation          close the step if the move was kept
//!   tear_down_iteration             close a leftover step, release the director
//! tear_down_trial
//! ```

mod benchmark;
mod traits;

#[cfg(test)]
mod tests;

pub use benchmark::{BenchmarkProblem, InvocationOutcome};
pub use traits::{InvocationKind, IterationSummary, LifecyclePhase, Problem};
