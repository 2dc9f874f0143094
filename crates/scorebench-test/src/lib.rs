//! Shared test fixtures for scorebench crates.
//!
//! This crate provides data types, descriptors and pure score functions.
//! It depends on `scorebench-core` only, so crates further up the stack can
//! use it as a dev-dependency without pulling in a second copy of their own
//! traits.
//!
//! - [`toggle`] - One entity type, one variable, two values
//! - [`workshop`] - Two entity types with variables, a problem fact type and pinning
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! scorebench-test = { workspace = true }
//! ```

pub mod toggle;
pub mod workshop;

pub use toggle::ToggleSolution;
pub use workshop::WorkshopSolution;
