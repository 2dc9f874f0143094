//! Score directors and their factories.

mod easy;
mod factory;
mod incremental;
mod shadow_aware;
mod traits;

#[cfg(test)]
mod tests;

pub use easy::EasyScoreDirector;
pub use factory::{
    EasyScoreDirectorFactory, IncrementalScoreDirectorFactory, ScoreDirectorFactory,
    ScoreDirectorFlags,
};
pub use incremental::{IncrementalScoreCalculator, IncrementalScoreDirector};
pub use shadow_aware::{
    ShadowAwareScoreDirector, ShadowAwareScoreDirectorFactory, ShadowVariableRef,
    ShadowVariableSupport,
};
pub use traits::{ConstraintMatchTotal, ScoreDirector};
