//! Move types applied by the benchmark.

mod change;
mod traits;


pub use change::ChangeMove;
pub use traits::Move;
