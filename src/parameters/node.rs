//! Calibration parameter nodes.
//!
//! A [`ParameterNode`] is a value ([`ParameterValue`]) plus the
//! [`Interpretation`] that says how the value acts on a relative motion.
//! Reduced nodes (scalar or 2-vector values) also carry an axis index that
//! places the value inside the `[x, y, θ]` pose vector.
//!
//! The interpretation is write-once: after a valid interpretation has been
//! set, a different one is refused with a warning.

use crate::{
    core::{
        CoreError, CoreResult,
        node::{Vertex, check_dimension},
    },
    io::record::{IoResult, RecordReader, RecordWriter},
    manifold::{LieGroup, se2::SE2},
    parameters::Interpretation,
};
use nalgebra::{DVector, Vector2, Vector3};
use tracing::warn;

/// Access to the current estimate of a node.
pub trait HasEstimate {
    type Estimate;

    fn estimate(&self) -> Self::Estimate;

    fn set_estimate(&mut self, estimate: Self::Estimate) -> CoreResult<()>;
}

/// Nodes whose value is applied under an [`Interpretation`].
pub trait HasInterpretation {
    fn interpretation(&self) -> Option<Interpretation>;

    /// Whether `interpretation` is meaningful for this node.
    fn accepts(&self, interpretation: Interpretation) -> bool;

    /// Set the interpretation from a record tag. Returns `false`, and leaves
    /// the node untouched, for unknown tags, tags this node does not accept
    /// and attempts to change an interpretation that is already set.
    fn set_interpretation(&mut self, tag: &str) -> bool;
}

/// Nodes that constrain only some axes of the pose vector.
pub trait HasAxisIndex {
    fn axis(&self) -> usize;

    fn set_axis(&mut self, axis: usize) -> CoreResult<()>;
}

/// Value held by a parameter node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterValue {
    /// Rigid transform, used by bias and offset parameters
    Se2(SE2),
    /// Full `[x, y, θ]` vector
    Vector3(Vector3<f64>),
    /// Two axes; the axis index names the axis that is filled
    Vector2(Vector2<f64>),
    /// One axis; the axis index names the constrained axis
    Scalar(f64),
}

impl ParameterValue {
    pub fn dimension(&self) -> usize {
        match self {
            ParameterValue::Se2(_) | ParameterValue::Vector3(_) => 3,
            ParameterValue::Vector2(_) => 2,
            ParameterValue::Scalar(_) => 1,
        }
    }

    fn as_dvector(&self) -> DVector<f64> {
        match self {
            ParameterValue::Se2(se2) => DVector::from(*se2),
            ParameterValue::Vector3(v) => DVector::from_column_slice(v.as_slice()),
            ParameterValue::Vector2(v) => DVector::from_column_slice(v.as_slice()),
            ParameterValue::Scalar(s) => DVector::from_element(1, *s),
        }
    }

    fn with_vector(&self, v: &DVector<f64>) -> ParameterValue {
        match self {
            ParameterValue::Se2(_) => ParameterValue::Se2(SE2::from_xy_angle(v[0], v[1], v[2])),
            ParameterValue::Vector3(_) => ParameterValue::Vector3(Vector3::new(v[0], v[1], v[2])),
            ParameterValue::Vector2(_) => ParameterValue::Vector2(Vector2::new(v[0], v[1])),
            ParameterValue::Scalar(_) => ParameterValue::Scalar(v[0]),
        }
    }

    fn same_kind(&self, other: &ParameterValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    fn kind_name(&self) -> &'static str {
        match self {
            ParameterValue::Se2(_) => "se2",
            ParameterValue::Vector3(_) => "vector3",
            ParameterValue::Vector2(_) => "vector2",
            ParameterValue::Scalar(_) => "scalar",
        }
    }
}

/// Where a parameter node's interpretation comes from when it is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLayout {
    /// Interpretation fixed by the node type; record holds the value only
    Fixed,
    /// Record starts with the interpretation tag
    Tagged,
    /// Record holds the value only; an edge assigns the interpretation
    Untagged,
}

const SE2_INTERPRETATIONS: &[Interpretation] = &[Interpretation::Bias, Interpretation::Offset];
const SCALE_ONLY: &[Interpretation] = &[Interpretation::Scale];
const BIAS_ONLY: &[Interpretation] = &[Interpretation::Bias];
const OFFSET_ONLY: &[Interpretation] = &[Interpretation::Offset];

/// Token written in place of an interpretation that was never set.
pub const UNSET_TAG: &str = "UNSET";

/// Calibration parameter node.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterNode {
    tag: &'static str,
    value: ParameterValue,
    interpretation: Option<Interpretation>,
    accepted: &'static [Interpretation],
    axis: usize,
    layout: RecordLayout,
}

impl ParameterNode {
    fn with_parts(
        tag: &'static str,
        value: ParameterValue,
        accepted: &'static [Interpretation],
        layout: RecordLayout,
    ) -> Self {
        let interpretation = match (layout, accepted) {
            (RecordLayout::Fixed, [only]) => Some(*only),
            _ => None,
        };
        let axis = match value {
            ParameterValue::Vector2(_) => 2,
            _ => 0,
        };
        Self {
            tag,
            value,
            interpretation,
            accepted,
            axis,
            layout,
        }
    }

    /// `PARAM_BIAS`: rigid bias, interpretation fixed to [`Interpretation::Bias`].
    pub fn bias() -> Self {
        Self::with_parts(
            "PARAM_BIAS",
            ParameterValue::Se2(SE2::identity()),
            BIAS_ONLY,
            RecordLayout::Fixed,
        )
    }

    /// `PARAM_OFFSET`: sensor extrinsic, interpretation fixed to [`Interpretation::Offset`].
    pub fn offset() -> Self {
        Self::with_parts(
            "PARAM_OFFSET",
            ParameterValue::Se2(SE2::identity()),
            OFFSET_ONLY,
            RecordLayout::Fixed,
        )
    }

    /// `PARAM_SCALE`: per-axis scale, interpretation fixed to [`Interpretation::Scale`].
    pub fn scale() -> Self {
        Self::with_parts(
            "PARAM_SCALE",
            ParameterValue::Vector3(Vector3::repeat(1.0)),
            SCALE_ONLY,
            RecordLayout::Fixed,
        )
    }

    /// `PARAM_SE2`: rigid parameter read as bias or offset.
    pub fn se2() -> Self {
        Self::with_parts(
            "PARAM_SE2",
            ParameterValue::Se2(SE2::identity()),
            SE2_INTERPRETATIONS,
            RecordLayout::Tagged,
        )
    }

    /// `PARAM_V1`: one-axis parameter.
    pub fn v1() -> Self {
        Self::with_parts(
            "PARAM_V1",
            ParameterValue::Scalar(0.0),
            &Interpretation::ALL,
            RecordLayout::Tagged,
        )
    }

    /// `PARAM_V2`: two-axis parameter.
    pub fn v2() -> Self {
        Self::with_parts(
            "PARAM_V2",
            ParameterValue::Vector2(Vector2::zeros()),
            &Interpretation::ALL,
            RecordLayout::Tagged,
        )
    }

    /// `PARAM_V3`: three-axis parameter.
    pub fn v3() -> Self {
        Self::with_parts(
            "PARAM_V3",
            ParameterValue::Vector3(Vector3::zeros()),
            &Interpretation::ALL,
            RecordLayout::Tagged,
        )
    }

    /// Same node type, but with the interpretation assigned by edges
    /// instead of being part of the node record.
    pub fn untagged(mut self) -> Self {
        if self.layout == RecordLayout::Tagged {
            self.layout = RecordLayout::Untagged;
        }
        self
    }

    /// Restrict the interpretations this node accepts.
    pub fn with_accepted(mut self, accepted: &'static [Interpretation]) -> Self {
        self.accepted = accepted;
        self
    }

    /// Only scale parameters are meaningful for a two-axis untagged node.
    pub fn scale_only(self) -> Self {
        self.with_accepted(SCALE_ONLY)
    }

    pub fn with_value(mut self, value: ParameterValue) -> CoreResult<Self> {
        self.set_estimate(value)?;
        Ok(self)
    }

    pub fn with_interpretation(mut self, interpretation: Interpretation) -> CoreResult<Self> {
        if self.assign_interpretation(interpretation) {
            Ok(self)
        } else {
            Err(CoreError::InvalidInput(format!(
                "{} does not accept interpretation {}",
                self.tag, interpretation
            )))
        }
    }

    pub fn with_axis(mut self, axis: usize) -> CoreResult<Self> {
        self.set_axis(axis)?;
        Ok(self)
    }

    pub fn value(&self) -> &ParameterValue {
        &self.value
    }

    pub fn layout(&self) -> RecordLayout {
        self.layout
    }

    /// Set an already parsed interpretation, with the same rules as
    /// [`HasInterpretation::set_interpretation`].
    pub fn assign_interpretation(&mut self, interpretation: Interpretation) -> bool {
        if !self.accepts(interpretation) {
            warn!(
                "{}: interpretation {} not accepted, keeping {:?}",
                self.tag, interpretation, self.interpretation
            );
            return false;
        }
        match self.interpretation {
            Some(current) if current == interpretation => true,
            Some(current) => {
                warn!(
                    "{}: interpretation already set to {}, refusing {}",
                    self.tag, current, interpretation
                );
                false
            }
            None => {
                self.interpretation = Some(interpretation);
                true
            }
        }
    }

    fn fill_value(&self) -> f64 {
        self.interpretation
            .map_or(0.0, Interpretation::fill_value)
    }

    /// The parameter as a `[x, y, θ]` vector, reduced values expanded with
    /// the interpretation's fill value.
    pub fn to_vector3(&self) -> Vector3<f64> {
        match self.value {
            ParameterValue::Se2(se2) => se2.to_vector(),
            ParameterValue::Vector3(v) => v,
            ParameterValue::Scalar(s) => {
                let mut v = Vector3::repeat(self.fill_value());
                v[self.axis] = s;
                v
            }
            ParameterValue::Vector2(pair) => {
                let mut v = Vector3::repeat(self.fill_value());
                let mut values = pair.iter();
                for (i, slot) in v.iter_mut().enumerate() {
                    if i != self.axis
                        && let Some(value) = values.next()
                    {
                        *slot = *value;
                    }
                }
                v
            }
        }
    }

    fn write_interpretation(&self, writer: &mut RecordWriter) {
        let tag = self.interpretation.map_or(UNSET_TAG, Interpretation::tag);
        writer.write_token(tag);
    }

    fn has_axis_field(&self) -> bool {
        self.layout == RecordLayout::Tagged
            && matches!(
                self.value,
                ParameterValue::Scalar(_) | ParameterValue::Vector2(_)
            )
    }
}

impl HasEstimate for ParameterNode {
    type Estimate = ParameterValue;

    fn estimate(&self) -> ParameterValue {
        self.value
    }

    fn set_estimate(&mut self, estimate: ParameterValue) -> CoreResult<()> {
        if !self.value.same_kind(&estimate) {
            return Err(CoreError::InvalidInput(format!(
                "{} holds a {} value, got a {} value",
                self.tag,
                self.value.kind_name(),
                estimate.kind_name()
            )));
        }
        self.value = estimate;
        Ok(())
    }
}

impl HasInterpretation for ParameterNode {
    fn interpretation(&self) -> Option<Interpretation> {
        self.interpretation
    }

    fn accepts(&self, interpretation: Interpretation) -> bool {
        self.accepted.contains(&interpretation)
    }

    fn set_interpretation(&mut self, tag: &str) -> bool {
        match Interpretation::parse(tag) {
            Some(interpretation) => self.assign_interpretation(interpretation),
            None => {
                warn!("{}: unknown interpretation tag {:?} ignored", self.tag, tag);
                false
            }
        }
    }
}

impl HasAxisIndex for ParameterNode {
    fn axis(&self) -> usize {
        self.axis
    }

    fn set_axis(&mut self, axis: usize) -> CoreResult<()> {
        if axis >= 3 {
            return Err(CoreError::InvalidInput(format!(
                "{}: axis index {} out of range",
                self.tag, axis
            )));
        }
        self.axis = axis;
        Ok(())
    }
}

impl Vertex for ParameterNode {
    fn tag(&self) -> &'static str {
        self.tag
    }

    fn dimension(&self) -> usize {
        self.value.dimension()
    }

    fn estimate_vector(&self) -> DVector<f64> {
        self.value.as_dvector()
    }

    fn set_estimate_vector(&mut self, estimate: &DVector<f64>) -> CoreResult<()> {
        check_dimension(self.dimension(), estimate)?;
        self.value = self.value.with_vector(estimate);
        Ok(())
    }

    /// Zero for bias and offset values, one for scale values.
    fn set_to_origin(&mut self) {
        let origin = DVector::from_element(self.dimension(), self.fill_value());
        self.value = self.value.with_vector(&origin);
    }

    fn oplus(&mut self, update: &DVector<f64>) -> CoreResult<()> {
        check_dimension(self.dimension(), update)?;
        let updated = self.value.as_dvector() + update;
        self.value = self.value.with_vector(&updated);
        Ok(())
    }

    fn read_fields(&mut self, reader: &mut RecordReader<'_>) -> IoResult<()> {
        if self.layout == RecordLayout::Tagged {
            let tag = reader.read_token("interpretation")?;
            self.set_interpretation(tag);
        }
        self.value = match self.value {
            ParameterValue::Se2(_) => ParameterValue::Se2(reader.read_se2("parameter")?),
            ParameterValue::Vector3(_) => {
                ParameterValue::Vector3(reader.read_vector3("parameter")?)
            }
            ParameterValue::Vector2(_) => {
                ParameterValue::Vector2(reader.read_vector2("parameter")?)
            }
            ParameterValue::Scalar(_) => ParameterValue::Scalar(reader.read_f64("parameter")?),
        };
        if self.has_axis_field() {
            self.axis = reader.read_axis("axis")?;
        }
        Ok(())
    }

    fn write(&self, writer: &mut RecordWriter) {
        if self.layout == RecordLayout::Tagged {
            self.write_interpretation(writer);
        }
        match &self.value {
            ParameterValue::Se2(se2) => writer.write_se2(se2),
            ParameterValue::Vector3(v) => writer.write_vector3(v),
            ParameterValue::Vector2(v) => writer.write_vector2(v),
            ParameterValue::Scalar(s) => writer.write_f64(*s),
        };
        if self.has_axis_field() {
            writer.write_usize(self.axis);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;
    use std::error::Error;

    #[test]
    fn test_interpretation_is_write_once() {
        let mut node = ParameterNode::se2();
        assert_eq!(node.interpretation(), None);

        assert!(node.set_interpretation("OFFSET"));
        assert_eq!(node.interpretation(), Some(Interpretation::Offset));

        // same tag again is accepted, a different one is not
        assert!(node.set_interpretation("offset"));
        assert!(!node.set_interpretation("BIAS"));
        assert_eq!(node.interpretation(), Some(Interpretation::Offset));
    }

    #[test]
    fn test_invalid_interpretation_is_ignored() {
        let mut node = ParameterNode::se2();
        assert!(!node.set_interpretation("SHEAR"));
        assert!(!node.set_interpretation("SCALE"));
        assert_eq!(node.interpretation(), None);
        assert!(node.set_interpretation("BIAS"));
    }

    #[test]
    fn test_fixed_nodes() {
        assert_eq!(
            ParameterNode::bias().interpretation(),
            Some(Interpretation::Bias)
        );
        assert_eq!(
            ParameterNode::offset().interpretation(),
            Some(Interpretation::Offset)
        );
        let mut scale = ParameterNode::scale();
        assert_eq!(scale.interpretation(), Some(Interpretation::Scale));
        assert_eq!(scale.to_vector3(), Vector3::new(1.0, 1.0, 1.0));
        assert!(!scale.set_interpretation("BIAS"));
    }

    #[test]
    fn test_reduced_parameters_fill_axes() -> Result<(), CoreError> {
        let v1 = ParameterNode::v1()
            .with_interpretation(Interpretation::Scale)?
            .with_value(ParameterValue::Scalar(2.0))?
            .with_axis(2)?;
        assert_eq!(v1.to_vector3(), Vector3::new(1.0, 1.0, 2.0));

        let v1_bias = ParameterNode::v1()
            .with_interpretation(Interpretation::Bias)?
            .with_value(ParameterValue::Scalar(0.5))?
            .with_axis(0)?;
        assert_eq!(v1_bias.to_vector3(), Vector3::new(0.5, 0.0, 0.0));

        let v2 = ParameterNode::v2()
            .with_interpretation(Interpretation::Scale)?
            .with_value(ParameterValue::Vector2(Vector2::new(2.0, 1.0)))?
            .with_axis(1)?;
        assert_eq!(v2.to_vector3(), Vector3::new(2.0, 1.0, 1.0));

        let v2_offset = ParameterNode::v2()
            .with_interpretation(Interpretation::Offset)?
            .with_value(ParameterValue::Vector2(Vector2::new(3.0, 4.0)))?
            .with_axis(0)?;
        assert_eq!(v2_offset.to_vector3(), Vector3::new(0.0, 3.0, 4.0));
        Ok(())
    }

    #[test]
    fn test_scale_v2_record_round_trip() -> Result<(), Box<dyn Error>> {
        let node = ParameterNode::v2()
            .with_interpretation(Interpretation::Scale)?
            .with_value(ParameterValue::Vector2(Vector2::new(2.0, 1.0)))?
            .with_axis(1)?;

        let mut writer = RecordWriter::new();
        node.write(&mut writer);
        assert_eq!(writer.as_str(), "SCALE 2 1 1");

        let mut restored = ParameterNode::v2();
        restored.read(&mut RecordReader::new(writer.as_str()))?;
        assert_eq!(restored.estimate(), node.estimate());
        assert_eq!(restored.interpretation(), Some(Interpretation::Scale));
        assert_eq!(restored.axis(), 1);
        assert_eq!(restored.to_vector3(), Vector3::new(2.0, 1.0, 1.0));
        Ok(())
    }

    #[test]
    fn test_record_layouts() -> Result<(), Box<dyn Error>> {
        let mut bias = ParameterNode::bias();
        bias.read(&mut RecordReader::new("1 0 0"))?;
        let mut writer = RecordWriter::new();
        bias.write(&mut writer);
        assert_eq!(writer.as_str(), "1 0 0");

        let mut untagged = ParameterNode::v2().untagged().scale_only();
        untagged.read(&mut RecordReader::new("1.5 0.5"))?;
        assert_eq!(untagged.interpretation(), None);
        assert!(untagged.assign_interpretation(Interpretation::Scale));
        assert_eq!(untagged.to_vector3(), Vector3::new(1.5, 0.5, 1.0));
        assert!(!untagged.assign_interpretation(Interpretation::Bias));

        let unset = ParameterNode::v3();
        let mut writer = RecordWriter::new();
        unset.write(&mut writer);
        assert_eq!(writer.as_str(), "UNSET 0 0 0");
        Ok(())
    }

    #[test]
    fn test_invalid_tag_is_consumed() -> Result<(), Box<dyn Error>> {
        let mut node = ParameterNode::v1();
        let mut reader = RecordReader::new("SHEAR 0.25 1");
        node.read(&mut reader)?;
        assert!(reader.is_exhausted());
        assert_eq!(node.interpretation(), None);
        assert_eq!(node.estimate(), ParameterValue::Scalar(0.25));
        assert_eq!(node.axis(), 1);
        Ok(())
    }

    #[test]
    fn test_record_ending_inside_value() -> Result<(), Box<dyn Error>> {
        let mut node = ParameterNode::v2();
        node.read(&mut RecordReader::new("SCALE 2"))?;
        assert_eq!(node.interpretation(), Some(Interpretation::Scale));
        assert_eq!(node.estimate(), ParameterValue::Vector2(Vector2::zeros()));

        let mut node = ParameterNode::v2();
        assert!(node.read(&mut RecordReader::new("SCALE 2 y")).is_err());
        Ok(())
    }

    #[test]
    fn test_vertex_updates() -> Result<(), CoreError> {
        let mut node = ParameterNode::scale();
        node.oplus(&dvector![0.5, 0.0, -0.5])?;
        assert_eq!(node.to_vector3(), Vector3::new(1.5, 1.0, 0.5));

        node.set_to_origin();
        assert_eq!(node.to_vector3(), Vector3::new(1.0, 1.0, 1.0));

        let mut v1 = ParameterNode::v1().with_interpretation(Interpretation::Bias)?;
        assert_eq!(v1.dimension(), 1);
        v1.set_estimate_vector(&dvector![3.0])?;
        assert_eq!(v1.estimate(), ParameterValue::Scalar(3.0));
        assert!(v1.set_estimate_vector(&dvector![3.0, 1.0]).is_err());
        assert!(
            v1.set_estimate(ParameterValue::Vector2(Vector2::zeros()))
                .is_err()
        );
        Ok(())
    }
}
