//! Scorebench Core - score types and the structural model of a benchmarked problem
//!
//! This crate provides the abstractions every other scorebench crate builds on:
//! - Score types for comparing solutions
//! - The `PlanningSolution` trait implemented by benchmarked domains
//! - Descriptor types enumerating entity types and their decision variables

pub mod domain;
pub mod score;

pub use domain::{EntityDescriptor, PlanningSolution, SolutionDescriptor, VariableDescriptor};
pub use score::{HardSoftScore, Score, SimpleScore};
