//! Group representations used by the calibration types.
//!
//! Only the planar rigid-motion group is needed here:
//!
//! Lie group M,° | size   | dim | X ∈ M             | Constraint | Comp. | Action
//! ------------- | ------ | --- | ----------------- | ---------- | ----- | ------
//! Rigid motion  | SE(2),.| 3   | M = [R t; 0 1]    | RᵀR = I    | M₁M₂  | Rx+t
//!
//! Poses, bias and offset parameters are all SE(2) elements. Scale parameters
//! are plain 3-vectors that act on the `[x, y, θ]` vector form of an element,
//! so the vector round trip ([`se2::SE2::to_vector`], [`se2::SE2::from_vector`])
//! is part of the group's public contract.

use std::{
    error, fmt,
    fmt::{Display, Formatter},
};

pub mod se2;

/// Errors that can occur during manifold operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifoldError {
    /// Dimension validation failed during conversion
    DimensionMismatch { expected: usize, actual: usize },
    /// NaN or Inf detected in manifold element
    InvalidNumber,
}

impl Display for ManifoldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ManifoldError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {expected}, got {actual}")
            }
            ManifoldError::InvalidNumber => {
                write!(f, "Invalid number: NaN or Inf detected")
            }
        }
    }
}

impl error::Error for ManifoldError {}

/// Result type for manifold operations.
pub type ManifoldResult<T> = Result<T, ManifoldError>;

/// Core trait for the group operations the residuals are built from.
///
/// Jacobians are not part of this trait: derivatives of the calibration
/// residuals are supplied by the host optimizer.
pub trait LieGroup: Clone + PartialEq {
    /// The neutral element e such that e ∘ g = g ∘ e = g.
    fn identity() -> Self;

    /// Compute the inverse of this element.
    ///
    /// For a group element g, returns g⁻¹ such that g ∘ g⁻¹ = e.
    fn inverse(&self) -> Self;

    /// Compose this element with another (group multiplication), g₁ ∘ g₂.
    fn compose(&self, other: &Self) -> Self;

    /// Relative element g₁⁻¹ ∘ g₂, expressed in the frame of `self`.
    fn between(&self, other: &Self) -> Self {
        self.inverse().compose(other)
    }

    /// Check if the element is approximately equal to another element.
    fn is_approx(&self, other: &Self, tolerance: f64) -> bool;

    /// Random element, used by property-style tests.
    fn random() -> Self;
}
