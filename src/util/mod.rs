//! Utility types and functions for RSM.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - [`LoadWarning`] - Non-fatal load diagnostics
//! - Math type re-exports from glam and [`BoundingBox`]

mod error;
mod math;

pub use error::*;
pub use math::*;
