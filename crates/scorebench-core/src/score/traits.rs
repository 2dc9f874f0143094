//! Core Score trait definition

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::ops::{Add, Neg, Sub};

/// Core trait for all score types.
///
/// A score is what a score director hands back after a (full or incremental)
/// recalculation. Benchmarks only compare and consume scores, so the trait is
/// kept to the operations needed for that:
/// - total ordering (higher is better)
/// - arithmetic, so incremental calculators can apply deltas
/// - level decomposition for reporting
pub trait Score:
    Copy
    + Debug
    + Display
    + Default
    + Hash
    + Send
    + Sync
    + Eq
    + Ord
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Returns the zero score (identity element for addition).
    fn zero() -> Self;

    /// Returns true if no hard level is negative.
    fn is_feasible(&self) -> bool;

    /// Returns the number of score levels.
    fn levels_count() -> usize;

    /// Returns the level values, highest priority first.
    fn to_level_numbers(&self) -> Vec<i64>;

    /// Returns true if this score is strictly better than `other`.
    fn is_better_than(&self, other: &Self) -> bool {
        self > other
    }
}
