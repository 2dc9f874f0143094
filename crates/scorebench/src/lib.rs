//! Micro-benchmark harness for incremental score calculation.
//!
//! A [`BenchmarkProblem`] reproduces how a local search solver uses a score
//! director: it samples random change moves, applies them, recalculates the
//! score and undoes most of them again, while opening and closing iteration
//! and step scopes the way a real solve would. A measurement harness (or the
//! bundled [`Benchmark`] runner) drives it through four nested levels:
//! trial, iteration, invocation, and the measured `run_invocation`.
//!
//! # Zero-Erasure Design
//!
//! The problem is generic over the solution type and the score director
//! factory, so the measured path is fully monomorphized. Only the runner
//! sees problems as [`Problem`] trait objects, outside the measured region.
//!
//! # Example
//!
//! ```
//! use scorebench::{create_problem, Blackhole};
//! use scorebench_config::{BenchmarkConfig, Example, ScoreDirectorType};
//!
//! let config = BenchmarkConfig::new().with_nqueens(8);
//! let mut problem =
//!     create_problem(Example::NQueens, ScoreDirectorType::Incremental, &config, 0).unwrap();
//! let mut blackhole = Blackhole::new();
//!
//! problem.setup_trial().unwrap();
//! problem.setup_iteration();
//! for _ in 0..100 {
//!     problem.setup_invocation().unwrap();
//!     problem.run_invocation(&mut blackhole);
//!     problem.tear_down_invocation();
//! }
//! let summary = problem.tear_down_iteration();
//! problem.tear_down_trial();
//!
//! assert_eq!(summary.invocations, 100);
//! ```

pub mod blackhole;
pub mod error;
pub mod example;
pub mod heuristic;
pub mod problem;
pub mod result;
pub mod runner;
pub mod scope;

pub use blackhole::Blackhole;
pub use error::{BenchmarkError, Result};
pub use example::create_problem;
pub use heuristic::{ChangeMove, Move, MoveSampler, MoveSelection};
pub use problem::{
    BenchmarkProblem, InvocationKind, InvocationOutcome, IterationSummary, LifecyclePhase, Problem,
};
pub use result::{BenchmarkResult, IterationMeasurement};
pub use runner::Benchmark;
pub use scope::{IterationScope, LifecycleListener, StepScope};
