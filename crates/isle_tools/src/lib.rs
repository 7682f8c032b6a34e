//! # Isle Development Tools
//!
//! Command-line helpers for working on the island prototype:
//! - ASCII map previews
//! - Parallel seed sweeps over the map generator
//! - Headless move-order runs
//! - Config validation

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ascii;
pub mod error;
pub mod simulate;
pub mod sweep;
pub mod validate;

pub use error::{Result, ToolError};
