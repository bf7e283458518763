//! Shared error taxonomy and geometry primitives.

/// Crate-wide error and result types.
pub mod error;
/// Scalar clamping and viewport/container geometry.
pub mod geometry;
