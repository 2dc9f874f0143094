//! Core domain traits

use crate::score::Score;

/// Marker trait for planning solutions.
///
/// A planning solution holds the problem facts, the planning entities and
/// their current variable assignments, and the last calculated score.
///
/// # Example
///
/// ```
/// use scorebench_core::{PlanningSolution, SimpleScore};
///
/// #[derive(Clone)]
/// struct Board {
///     rows: Vec<Option<usize>>,
///     score: Option<SimpleScore>,
/// }
///
/// impl PlanningSolution for Board {
///     type Score = SimpleScore;
///
///     fn score(&self) -> Option<Self::Score> {
///         self.score
///     }
///
///     fn set_score(&mut self, score: Option<Self::Score>) {
///         self.score = score;
///     }
/// }
/// ```
pub trait PlanningSolution: Clone + Send + Sync + 'static {
    /// The score type used to evaluate this solution.
    type Score: Score;

    /// Returns the last calculated score, or `None` if never scored.
    fn score(&self) -> Option<Self::Score>;

    /// Sets the score of this solution.
    fn set_score(&mut self, score: Option<Self::Score>);
}
