//! # Planetfall Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Catalog and planet fixtures
//! - Pre-built derived rosters for combat scenarios
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
