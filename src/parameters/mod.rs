//! Calibration parameters and the semantics used to apply them.
//!
//! A calibration parameter is always consumed as a 3-vector in the
//! `[x, y, θ]` pose-vector space. The [`Interpretation`] attached to the
//! parameter decides how that vector acts on a relative motion:
//!
//! - **Bias**: right-multiplicative correction, `T ∘ p`.
//! - **Offset**: conjugation by a sensor extrinsic, `p ∘ T ∘ p⁻¹`.
//! - **Scale**: per-axis reweighting of the vector form, `diag(p) · vec(T)`.
//!
//! Inverting a scale parameter has two conventions in use across the edge
//! types (additive sign flip and component-wise reciprocal). They are not
//! interchangeable, so every caller names its [`ScaleInversion`] explicitly.

pub mod node;
pub mod variance;

use crate::manifold::{LieGroup, se2::SE2};
use nalgebra::{Vector2, Vector3};
use std::{
    fmt,
    fmt::{Display, Formatter},
};
use tracing::warn;

pub use node::{HasAxisIndex, HasEstimate, HasInterpretation, ParameterNode, ParameterValue};
pub use variance::VarianceNode;

/// How a parameter vector acts on a relative motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpretation {
    Bias,
    Offset,
    Scale,
}

impl Interpretation {
    /// All interpretations, in tag order.
    pub const ALL: [Interpretation; 3] = [
        Interpretation::Bias,
        Interpretation::Offset,
        Interpretation::Scale,
    ];

    /// Record tag for this interpretation.
    pub fn tag(self) -> &'static str {
        match self {
            Interpretation::Bias => "BIAS",
            Interpretation::Offset => "OFFSET",
            Interpretation::Scale => "SCALE",
        }
    }

    /// Parse a record tag. Tags are matched case-insensitively since both
    /// spellings appear in existing data files.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|interpretation| interpretation.tag().eq_ignore_ascii_case(tag))
    }

    /// Value used for the pose-vector axes a reduced parameter does not constrain.
    pub fn fill_value(self) -> f64 {
        match self {
            Interpretation::Bias | Interpretation::Offset => 0.0,
            Interpretation::Scale => 1.0,
        }
    }

    /// Apply a parameter to `transform` under this interpretation.
    ///
    /// `parameter` is the 3-vector form of the parameter. With `inverse` set
    /// the inverse parameter is applied; for bias and offset this is always
    /// the group inverse, for scale it follows `scale_inversion`.
    pub fn compose(
        self,
        transform: &SE2,
        parameter: &Vector3<f64>,
        inverse: bool,
        scale_inversion: ScaleInversion,
    ) -> SE2 {
        match self {
            Interpretation::Bias => {
                let p = group_parameter(parameter, inverse);
                transform.compose(&p)
            }
            Interpretation::Offset => {
                let q = group_parameter(parameter, inverse);
                q.compose(transform).compose(&q.inverse())
            }
            Interpretation::Scale => {
                let scale = if inverse {
                    scale_inversion.invert(parameter)
                } else {
                    *parameter
                };
                SE2::from_vector(&scale.component_mul(&transform.to_vector()))
            }
        }
    }
}

impl Display for Interpretation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

fn group_parameter(parameter: &Vector3<f64>, inverse: bool) -> SE2 {
    let p = SE2::from_vector(parameter);
    if inverse { p.inverse() } else { p }
}

/// Convention used when a scale parameter has to be inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleInversion {
    /// `s ↦ -s`
    Negate,
    /// `s ↦ 1/s`, per component
    Reciprocal,
}

impl ScaleInversion {
    pub fn invert(self, scale: &Vector3<f64>) -> Vector3<f64> {
        match self {
            ScaleInversion::Negate => -scale,
            ScaleInversion::Reciprocal => scale.map(|s| 1.0 / s),
        }
    }
}

/// Compose `transform` with a parameter whose interpretation may be unset.
///
/// An unset interpretation leaves the transform unchanged. That keeps old
/// records loadable, but it silently disables the constraint, so it is
/// reported at warn level together with `owner`.
pub fn compose(
    transform: &SE2,
    parameter: &Vector3<f64>,
    interpretation: Option<Interpretation>,
    inverse: bool,
    scale_inversion: ScaleInversion,
    owner: &str,
) -> SE2 {
    match interpretation {
        Some(interpretation) => {
            interpretation.compose(transform, parameter, inverse, scale_inversion)
        }
        None => {
            warn!("{owner}: parameter interpretation not set, transform passed through unchanged");
            *transform
        }
    }
}

/// Apply a parameter to a pure translation and return the moved translation.
pub fn translate(
    interpretation: Option<Interpretation>,
    translation: &Vector2<f64>,
    parameter: &Vector3<f64>,
    inverse: bool,
    scale_inversion: ScaleInversion,
) -> Vector2<f64> {
    let pose = SE2::from_xy_angle(translation.x, translation.y, 0.0);
    compose(
        &pose,
        parameter,
        interpretation,
        inverse,
        scale_inversion,
        "translate",
    )
    .translation()
}
