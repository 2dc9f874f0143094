//! Move selection for the simulated local search.

mod sampler;


pub use sampler::{MoveSampler, MoveSelection};
