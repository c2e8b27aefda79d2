//! SE(2) - Special Euclidean Group in 2D
//!
//! This module implements the Special Euclidean group SE(2), which represents
//! rigid body transformations in 2D space (rotation + translation). Robot poses,
//! relative-motion measurements, bias parameters and offset parameters are all
//! SE(2) elements.
//!
//! SE(2) elements are represented as a combination of 2D rotation and Vector2 translation.
//! The vector form of an element is `[x, y, theta]` with theta normalized to `(-π, π]`;
//! this is the form that is written to records and that scale parameters act on.

use crate::manifold::{LieGroup, ManifoldError, ManifoldResult};
use nalgebra::{DVector, Point2, UnitComplex, Vector2, Vector3};
use std::{
    fmt,
    fmt::{Display, Formatter},
    ops::Mul,
};

/// SE(2) group element representing rigid body transformations in 2D.
///
/// Represented as a combination of 2D rotation and Vector2 translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SE2 {
    /// Translation part as Vector2
    translation: Vector2<f64>,
    /// Rotation part as UnitComplex
    rotation: UnitComplex<f64>,
}

impl Display for SE2 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let t = self.translation();
        write!(
            f,
            "SE2(translation: [{:.4}, {:.4}], rotation: {:.4})",
            t.x,
            t.y,
            self.angle()
        )
    }
}

impl From<Vector3<f64>> for SE2 {
    fn from(vector: Vector3<f64>) -> Self {
        SE2::from_vector(&vector)
    }
}

impl From<SE2> for Vector3<f64> {
    fn from(se2: SE2) -> Self {
        se2.to_vector()
    }
}

impl From<SE2> for DVector<f64> {
    fn from(se2: SE2) -> Self {
        DVector::from_vec(vec![se2.x(), se2.y(), se2.angle()])
    }
}

impl TryFrom<&DVector<f64>> for SE2 {
    type Error = ManifoldError;

    fn try_from(data: &DVector<f64>) -> ManifoldResult<Self> {
        if data.len() != SE2::DOF {
            return Err(ManifoldError::DimensionMismatch {
                expected: SE2::DOF,
                actual: data.len(),
            });
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(ManifoldError::InvalidNumber);
        }
        Ok(SE2::from_xy_angle(data[0], data[1], data[2]))
    }
}

impl Mul for SE2 {
    type Output = SE2;

    fn mul(self, rhs: SE2) -> SE2 {
        self.compose(&rhs)
    }
}

impl Mul<&SE2> for &SE2 {
    type Output = SE2;

    fn mul(self, rhs: &SE2) -> SE2 {
        self.compose(rhs)
    }
}

impl SE2 {
    /// Degrees of freedom, the length of the vector form
    pub const DOF: usize = 3;

    /// Create a new SE2 element from translation and rotation.
    ///
    /// # Arguments
    /// * `translation` - Translation vector [x, y]
    /// * `rotation` - Unit complex number representing rotation
    pub fn new(translation: Vector2<f64>, rotation: UnitComplex<f64>) -> Self {
        SE2 {
            translation,
            rotation,
        }
    }

    /// Create SE2 from translation components and angle.
    pub fn from_xy_angle(x: f64, y: f64, theta: f64) -> Self {
        let translation = Vector2::new(x, y);
        let rotation = UnitComplex::from_angle(theta);
        Self::new(translation, rotation)
    }

    /// Create SE2 from its `[x, y, theta]` vector form.
    pub fn from_vector(vector: &Vector3<f64>) -> Self {
        Self::from_xy_angle(vector[0], vector[1], vector[2])
    }

    /// The `[x, y, theta]` vector form, theta in `(-π, π]`.
    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.translation.x, self.translation.y, self.angle())
    }

    /// Get the translation part as a Vector2.
    pub fn translation(&self) -> Vector2<f64> {
        self.translation
    }

    /// Homogeneous 3x3 matrix, for checking compositions in tests.
    #[cfg(test)]
    pub(crate) fn matrix(&self) -> nalgebra::Matrix3<f64> {
        nalgebra::Isometry2::from_parts(self.translation.into(), self.rotation).to_homogeneous()
    }

    /// Get the x component of translation.
    pub fn x(&self) -> f64 {
        self.translation.x
    }

    /// Get the y component of translation.
    pub fn y(&self) -> f64 {
        self.translation.y
    }

    /// Get the rotation angle in radians.
    pub fn angle(&self) -> f64 {
        self.rotation.angle()
    }

    /// Apply the transformation to a 2D point: R·p + t.
    pub fn transform_point(&self, point: &Vector2<f64>) -> Vector2<f64> {
        self.rotation.transform_point(&Point2::from(*point)).coords + self.translation
    }
}

impl Default for SE2 {
    fn default() -> Self {
        <SE2 as LieGroup>::identity()
    }
}

impl LieGroup for SE2 {
    fn identity() -> Self {
        SE2 {
            translation: Vector2::zeros(),
            rotation: UnitComplex::identity(),
        }
    }

    /// For SE(2): g^{-1} = [R^T, -R^T * t; 0, 1]
    fn inverse(&self) -> Self {
        let rot_inv = self.rotation.inverse();
        let trans_inv = -(rot_inv * self.translation);
        SE2::new(trans_inv, rot_inv)
    }

    fn compose(&self, other: &Self) -> Self {
        let composed_rotation = self.rotation * other.rotation;
        let composed_translation = self.transform_point(&other.translation);
        SE2::new(composed_translation, composed_rotation)
    }

    fn is_approx(&self, other: &Self, tolerance: f64) -> bool {
        let difference = self.between(other);
        difference.translation.norm() < tolerance && difference.angle().abs() < tolerance
    }

    fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();

        // Random translation in [-1, 1]²
        let translation = Vector2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));

        // Random rotation
        let angle = rng.random_range(-std::f64::consts::PI..std::f64::consts::PI);
        let rotation = UnitComplex::from_angle(angle);

        SE2::new(translation, rotation)
    }
}
