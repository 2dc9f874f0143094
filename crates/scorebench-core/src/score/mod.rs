//! Score types for representing solution quality
//!
//! Scores are immutable values compared level by level, highest priority first.

mod hard_soft;
mod simple;
mod traits;


pub use hard_soft::HardSoftScore;
pub use simple::SimpleScore;
pub use traits::Score;
