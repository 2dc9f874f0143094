//! Heuristic components for simulated local search
//!
//! This module contains:
//! - Moves: reversible changes of one planning variable
//! - Selectors: the random move sampler

pub mod r#move;
pub mod selector;

pub use r#move::{ChangeMove, Move};
pub use selector::{MoveSampler, MoveSelection};
