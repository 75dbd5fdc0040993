#![warn(missing_docs)]

//! Error types for the geometry library.
//!
//! This module defines the errors returned when constructing geometric
//! primitives from invalid input.

use core::fmt;

/// Errors that can occur when building geometric primitives.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A rectangle was given a negative width or height.
    NegativeExtent(&'static str),
    /// A coordinate was NaN or infinite.
    NonFiniteCoordinate(&'static str),
}

impl core::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::NegativeExtent(msg) => write!(f, "Negative extent: {}", msg),
            GeometryError::NonFiniteCoordinate(msg) => write!(f, "Non-finite coordinate: {}", msg),
        }
    }
}

impl core::error::Error for GeometryError {}
