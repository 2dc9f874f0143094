//! Error types for the benchmark harness.

use scorebench_config::{ConfigError, Example, ScoreDirectorType};
use thiserror::Error;

/// Main error type for benchmark operations
#[derive(Debug, Error)]
pub enum BenchmarkError {
    /// The solution descriptor declares no genuine planning variable to change.
    #[error("No selectable moves: {solution_type} declares no genuine planning variables")]
    NoSelectableMoves { solution_type: &'static str },

    /// The move sampler probed its whole budget without finding a doable move.
    #[error("Move exhaustion: no doable move found in {probes} candidates")]
    MoveExhaustion { probes: usize },

    /// The example cannot be scored by the requested score director type.
    #[error("Unsupported combination: {example} cannot be benchmarked with the {score_director_type} score director")]
    UnsupportedCombination {
        example: Example,
        score_director_type: ScoreDirectorType,
    },

    /// A benchmark setting is out of range.
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for benchmark operations
pub type Result<T> = std::result::Result<T, BenchmarkError>;
