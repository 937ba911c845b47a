//! # Assembly Common
//!
//! Common types and shared abstractions for the Assembly production planner.
//!
//! This crate provides foundational types used across the workspace:
//! - Error types for planning queries and dataset loading
//! - Node identifiers for the produces/consumes graph
//! - Schema version for dataset files
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::version::*;
}

pub use prelude::*;
