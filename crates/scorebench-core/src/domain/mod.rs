//! Domain model traits and descriptors for benchmarked planning problems
//!
//! - `PlanningSolution`: the container for the complete problem and its assignment
//! - `SolutionDescriptor`: runtime enumeration of entity types and their
//!   genuine decision variables, with typed accessors

mod descriptor;
mod traits;


pub use descriptor::{
    EntityDescriptor, PinningFn, SolutionDescriptor, ValueCountFn, VariableDescriptor,
    VariableGetter, VariableSetter,
};
pub use traits::PlanningSolution;
