//! Reference score directors for the score director benchmark.
//!
//! A score director owns the working solution of one benchmark iteration,
//! receives variable change notifications from moves and recalculates the
//! score on demand. Two implementations are provided:
//! - [`EasyScoreDirector`]: full recalculation through a closure
//! - [`IncrementalScoreDirector`]: delta updates through an
//!   [`IncrementalScoreCalculator`], optionally tracking constraint matches
//!
//! [`ShadowAwareScoreDirector`] wraps either one and keeps shadow variables
//! in line with their sources.

pub mod director;

pub use director::{
    ConstraintMatchTotal, EasyScoreDirector, EasyScoreDirectorFactory,
    IncrementalScoreCalculator, IncrementalScoreDirector, IncrementalScoreDirectorFactory,
    ScoreDirector, ScoreDirectorFactory, ScoreDirectorFlags, ShadowAwareScoreDirector,
    ShadowAwareScoreDirectorFactory, ShadowVariableRef, ShadowVariableSupport,
};
