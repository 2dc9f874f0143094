//! Configuration system for the score director benchmark.
//!
//! Select which examples and score director types to benchmark, how many
//! forks and iterations to run, and how the simulated local search behaves,
//! without code changes.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use scorebench_config::{BenchmarkConfig, Example, ScoreDirectorType};
//!
//! let config = BenchmarkConfig::from_toml_str(r#"
//!     enabled_examples = ["nqueens"]
//!     enabled_score_director_types = ["easy", "incremental"]
//!     forks = 2
//!     measurement_iterations = 5
//!
//!     [nqueens]
//!     n = 32
//! "#).unwrap();
//!
//! assert_eq!(config.forks, 2);
//! assert_eq!(config.nqueens.n, 32);
//! assert_eq!(
//!     config.supported_examples(ScoreDirectorType::Easy),
//!     vec![Example::NQueens]
//! );
//! ```
//!
//! Use the default configuration when the file is missing:
//!
//! ```
//! use scorebench_config::BenchmarkConfig;
//!
//! let config = BenchmarkConfig::load("scorebench.toml").unwrap_or_default();
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;


/// Probability that a simulated local search undoes the move it just tried.
pub const DEFAULT_UNDO_PROBABILITY: f64 = 0.9;

/// Candidate moves probed per invocation before giving up.
pub const DEFAULT_MOVE_PROBE_LIMIT: usize = 10_000;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Score director implementations that can be benchmarked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreDirectorType {
    /// Full recalculation of the score after every change.
    Easy,

    /// Incremental recalculation from variable change notifications.
    Incremental,

    /// Incremental recalculation that also tracks constraint matches.
    IncrementalJustified,
}

impl ScoreDirectorType {
    /// All score director types, in benchmark order.
    pub const ALL: [ScoreDirectorType; 3] = [
        ScoreDirectorType::Easy,
        ScoreDirectorType::Incremental,
        ScoreDirectorType::IncrementalJustified,
    ];

    /// Returns true if directors of this type track constraint matches.
    pub fn is_constraint_match_enabled(&self) -> bool {
        matches!(self, ScoreDirectorType::IncrementalJustified)
    }
}

impl fmt::Display for ScoreDirectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScoreDirectorType::Easy => "easy",
            ScoreDirectorType::Incremental => "incremental",
            ScoreDirectorType::IncrementalJustified => "incremental_justified",
        };
        f.write_str(name)
    }
}

/// Benchmarked example problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Example {
    /// Place N queens on an N×N board without attacks.
    #[serde(rename = "nqueens")]
    NQueens,

    /// Assign exams to periods and rooms.
    Examination,
}

impl Example {
    /// All examples, in benchmark order.
    pub const ALL: [Example; 2] = [Example::NQueens, Example::Examination];

    /// Returns true if this example can be scored by the given director type.
    pub fn is_supported_on(&self, score_director_type: ScoreDirectorType) -> bool {
        match self {
            Example::NQueens => true,
            Example::Examination => !score_director_type.is_constraint_match_enabled(),
        }
    }
}

impl fmt::Display for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Example::NQueens => "nqueens",
            Example::Examination => "examination",
        };
        f.write_str(name)
    }
}

/// N-Queens problem size.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct NQueensConfig {
    /// Board size and queen count.
    pub n: usize,
}

impl Default for NQueensConfig {
    fn default() -> Self {
        Self { n: 256 }
    }
}

/// Examination problem size.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ExaminationConfig {
    pub exam_count: usize,
    pub period_count: usize,
    pub room_count: usize,
    pub student_count: usize,
}

impl Default for ExaminationConfig {
    fn default() -> Self {
        Self {
            exam_count: 400,
            period_count: 40,
            room_count: 10,
            student_count: 4_000,
        }
    }
}

/// Main benchmark configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct BenchmarkConfig {
    /// Examples to benchmark.
    pub enabled_examples: Vec<Example>,

    /// Score director types to benchmark.
    pub enabled_score_director_types: Vec<ScoreDirectorType>,

    /// Number of independent forks; each fork starts from its own seed.
    pub forks: usize,

    /// Iterations run before measuring.
    pub warmup_iterations: usize,

    /// Measured iterations.
    pub measurement_iterations: usize,

    /// Maximum invocations per iteration.
    pub invocations_per_iteration: u64,

    /// Optional wall-clock limit per iteration, in milliseconds.
    pub iteration_time_limit_ms: Option<u64>,

    /// Base seed; fork `k` uses `random_seed + k`.
    pub random_seed: u64,

    /// Probability that an invocation undoes its move.
    pub undo_probability: f64,

    /// Candidate moves probed per invocation before reporting exhaustion.
    pub move_probe_limit: usize,

    /// N-Queens problem size.
    pub nqueens: NQueensConfig,

    /// Examination problem size.
    pub examination: ExaminationConfig,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            enabled_examples: Example::ALL.to_vec(),
            enabled_score_director_types: ScoreDirectorType::ALL.to_vec(),
            forks: 1,
            warmup_iterations: 1,
            measurement_iterations: 3,
            invocations_per_iteration: 10_000,
            iteration_time_limit_ms: None,
            random_seed: 0,
            undo_probability: DEFAULT_UNDO_PROBABILITY,
            move_probe_limit: DEFAULT_MOVE_PROBE_LIMIT,
            nqueens: NQueensConfig::default(),
            examination: ExaminationConfig::default(),
        }
    }
}

impl BenchmarkConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file; `.yaml`/`.yml` files are read as YAML,
    /// anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist or cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Restricts the benchmark to the given examples.
    pub fn with_examples(mut self, examples: impl IntoIterator<Item = Example>) -> Self {
        self.enabled_examples = examples.into_iter().collect();
        self
    }

    /// Restricts the benchmark to the given score director types.
    pub fn with_score_director_types(
        mut self,
        types: impl IntoIterator<Item = ScoreDirectorType>,
    ) -> Self {
        self.enabled_score_director_types = types.into_iter().collect();
        self
    }

    pub fn with_forks(mut self, forks: usize) -> Self {
        self.forks = forks;
        self
    }

    pub fn with_warmup_iterations(mut self, count: usize) -> Self {
        self.warmup_iterations = count;
        self
    }

    pub fn with_measurement_iterations(mut self, count: usize) -> Self {
        self.measurement_iterations = count;
        self
    }

    pub fn with_invocations_per_iteration(mut self, count: u64) -> Self {
        self.invocations_per_iteration = count;
        self
    }

    pub fn with_iteration_time_limit(mut self, limit: Duration) -> Self {
        self.iteration_time_limit_ms = Some(limit.as_millis() as u64);
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Sets the undo probability.
    ///
    /// # Example
    ///
    /// ```
    /// use scorebench_config::BenchmarkConfig;
    ///
    /// let config = BenchmarkConfig::new().with_undo_probability(1.5);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn with_undo_probability(mut self, probability: f64) -> Self {
        self.undo_probability = probability;
        self
    }

    pub fn with_move_probe_limit(mut self, limit: usize) -> Self {
        self.move_probe_limit = limit;
        self
    }

    pub fn with_nqueens(mut self, n: usize) -> Self {
        self.nqueens = NQueensConfig { n };
        self
    }

    pub fn with_examination(mut self, examination: ExaminationConfig) -> Self {
        self.examination = examination;
        self
    }

    /// Returns the per-iteration time limit, if configured.
    pub fn iteration_time_limit(&self) -> Option<Duration> {
        self.iteration_time_limit_ms.map(Duration::from_millis)
    }

    /// Returns the seed of the given fork.
    pub fn fork_seed(&self, fork_index: usize) -> u64 {
        self.random_seed.wrapping_add(fork_index as u64)
    }

    /// Returns the enabled examples that support `score_director_type`.
    ///
    /// Empty if the score director type itself is not enabled.
    pub fn supported_examples(&self, score_director_type: ScoreDirectorType) -> Vec<Example> {
        if !self
            .enabled_score_director_types
            .contains(&score_director_type)
        {
            return Vec::new();
        }
        self.enabled_examples
            .iter()
            .copied()
            .filter(|example| example.is_supported_on(score_director_type))
            .collect()
    }

    /// Checks value ranges and problem sizes.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.undo_probability) {
            return Err(ConfigError::Invalid(format!(
                "undo_probability must be within [0.0, 1.0], got {}",
                self.undo_probability
            )));
        }
        if self.forks == 0 {
            return Err(ConfigError::Invalid("forks must be > 0".to_string()));
        }
        if self.measurement_iterations == 0 {
            return Err(ConfigError::Invalid(
                "measurement_iterations must be > 0".to_string(),
            ));
        }
        if self.invocations_per_iteration == 0 {
            return Err(ConfigError::Invalid(
                "invocations_per_iteration must be > 0".to_string(),
            ));
        }
        if self.move_probe_limit == 0 {
            return Err(ConfigError::Invalid("move_probe_limit must be > 0".to_string()));
        }
        if self.nqueens.n < 2 {
            return Err(ConfigError::Invalid("nqueens.n must be >= 2".to_string()));
        }
        let exam = &self.examination;
        if exam.exam_count == 0 || exam.period_count < 2 || exam.room_count == 0 || exam.student_count == 0
        {
            return Err(ConfigError::Invalid(
                "examination needs exams, students, at least one room and two periods".to_string(),
            ));
        }
        Ok(())
    }
}
