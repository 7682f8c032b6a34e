//! # Isle Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Scripted replay and map regeneration checks
//! - ASCII map fixtures and reference scenarios
//! - Independent map invariant checks
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod invariants;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
