//! Calibration edges whose parameter meaning is decided at run time.
//!
//! [`InterpretedEdge`] takes the interpretation from the parameter node's
//! own record. The scale inversion convention differs between the edge
//! types, so it is part of each constructor:
//!
//! | Tag                            | Parameter node | Scale inversion | Bootstraps |
//! | ------------------------------ | -------------- | --------------- | ---------- |
//! | `CONSTRAINT_POSES2D_SE2_PSE2`  | `PARAM_SE2`    | n/a             | yes        |
//! | `CONSTRAINT_POSES2D_SE2_PV3`   | `PARAM_V3`     | reciprocal      | yes        |
//! | `CONSTRAINT_POSES2D_SE2_SE2`   | `PARAM_SE2`    | negate          | no         |
//! | `CONSTRAINT_POSES2D_SE2_V1`    | `PARAM_V1`     | negate          | no         |
//! | `CONSTRAINT_POSES2D_SE2_V2`    | `PARAM_V2`     | negate          | no         |
//! | `CONSTRAINT_POSES2D_SE2_V3`    | `PARAM_V3`     | negate          | no         |
//!
//! Negating a scale is not the inverse of applying it, so edges using that
//! convention never claim they can initialize a pose. The `PV3` edge only
//! evaluates scale parameters; a `PARAM_V3` node with any other
//! interpretation is refused when the edge is added.
//!
//! [`TaggedEdge`] stores the interpretation in its own record, right after
//! the measurement, and hands it to the parameter node when the edge joins
//! a graph. Its models apply the bias forward:
//!
//! | Interpretation | Model of `delta`        |
//! | -------------- | ----------------------- |
//! | bias           | `delta ∘ b`             |
//! | offset         | `o⁻¹ ∘ delta ∘ o`       |
//! | scale          | `diag(s0, s1, 1)·delta` |

use crate::{
    core::{NodeId, NodeKind, NodeSet, graph::NodeArena},
    edges::{
        CANNOT_INITIALIZE, Edge, EdgeError, EdgeResult, Endpoints, PoseMeasurement,
        has_interpretation, pose_delta, propagate_pose, relative_pose_score,
    },
    io::record::{IoResult, RecordReader, RecordWriter},
    manifold::se2::SE2,
    parameters::{
        HasInterpretation, Interpretation, ScaleInversion, compose, node::UNSET_TAG,
    },
};
use nalgebra::{Matrix3, Vector3};
use tracing::warn;

/// Residual with the interpretation read from the parameter node.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpretedEdge {
    tag: &'static str,
    scale_inversion: ScaleInversion,
    accepted: &'static [Interpretation],
    endpoints: Endpoints<3>,
    measurement: PoseMeasurement,
    error: Vector3<f64>,
}

impl InterpretedEdge {
    pub const PSE2_TAG: &'static str = "CONSTRAINT_POSES2D_SE2_PSE2";
    pub const PV3_TAG: &'static str = "CONSTRAINT_POSES2D_SE2_PV3";
    pub const SE2_TAG: &'static str = "CONSTRAINT_POSES2D_SE2_SE2";
    pub const V1_TAG: &'static str = "CONSTRAINT_POSES2D_SE2_V1";
    pub const V2_TAG: &'static str = "CONSTRAINT_POSES2D_SE2_V2";
    pub const V3_TAG: &'static str = "CONSTRAINT_POSES2D_SE2_V3";

    fn with_policy(tag: &'static str, scale_inversion: ScaleInversion) -> Self {
        Self {
            tag,
            scale_inversion,
            accepted: &Interpretation::ALL,
            endpoints: Endpoints::default(),
            measurement: PoseMeasurement::default(),
            error: Vector3::zeros(),
        }
    }

    pub fn pse2() -> Self {
        Self::with_policy(Self::PSE2_TAG, ScaleInversion::Reciprocal)
    }

    pub fn pv3() -> Self {
        Self {
            accepted: &[Interpretation::Scale],
            ..Self::with_policy(Self::PV3_TAG, ScaleInversion::Reciprocal)
        }
    }

    pub fn se2() -> Self {
        Self::with_policy(Self::SE2_TAG, ScaleInversion::Negate)
    }

    pub fn v1() -> Self {
        Self::with_policy(Self::V1_TAG, ScaleInversion::Negate)
    }

    pub fn v2() -> Self {
        Self::with_policy(Self::V2_TAG, ScaleInversion::Negate)
    }

    pub fn v3() -> Self {
        Self::with_policy(Self::V3_TAG, ScaleInversion::Negate)
    }

    pub fn between(mut self, pose1: NodeId, pose2: NodeId, parameter: NodeId) -> Self {
        self.endpoints = Endpoints::new([pose1, pose2, parameter]);
        self
    }

    pub fn with_measurement(mut self, measurement: SE2) -> Self {
        self.measurement.set_measurement(measurement);
        self
    }

    pub fn with_information(mut self, information: Matrix3<f64>) -> Self {
        self.measurement.set_information(information);
        self
    }

    pub fn scale_inversion(&self) -> ScaleInversion {
        self.scale_inversion
    }

    pub fn measurement(&self) -> &PoseMeasurement {
        &self.measurement
    }

    fn poses(&self) -> [NodeId; 2] {
        let [pose1, pose2, _] = *self.endpoints.ids();
        [pose1, pose2]
    }

    fn parameter(&self) -> NodeId {
        self.endpoints.ids()[2]
    }

    fn check_accepted(&self, interpretation: Option<Interpretation>) -> EdgeResult<()> {
        match interpretation {
            Some(interpretation) if !self.accepted.contains(&interpretation) => {
                Err(EdgeError::RejectedInterpretation {
                    tag: self.tag,
                    node: self.parameter(),
                    interpretation,
                })
            }
            _ => Ok(()),
        }
    }
}

impl Edge for InterpretedEdge {
    fn tag(&self) -> &'static str {
        self.tag
    }

    fn vertices(&self) -> &[NodeId] {
        self.endpoints.as_slice()
    }

    fn vertex_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Pose, NodeKind::Pose, NodeKind::Parameter]
    }

    fn set_vertices(&mut self, vertices: &[NodeId]) -> EdgeResult<()> {
        self.endpoints.set(self.tag, vertices)
    }

    fn compute_error(&mut self, nodes: &NodeArena) -> EdgeResult<()> {
        let [pose1, pose2] = self.poses();
        let delta = pose_delta(nodes, pose1, pose2)?;
        let parameter = nodes.parameter(self.parameter())?;
        self.check_accepted(parameter.interpretation())?;
        let model = compose(
            &delta,
            &parameter.to_vector3(),
            parameter.interpretation(),
            true,
            self.scale_inversion,
            self.tag,
        );
        self.error = self.measurement.residual(&model);
        Ok(())
    }

    fn error(&self) -> &Vector3<f64> {
        &self.error
    }

    fn information(&self) -> Matrix3<f64> {
        *self.measurement.information()
    }

    fn read_fields(&mut self, reader: &mut RecordReader<'_>) -> IoResult<()> {
        self.measurement.read_measurement(reader)?;
        self.measurement.read_information(reader)
    }

    fn write(&self, writer: &mut RecordWriter) {
        self.measurement.write_measurement(writer);
        self.measurement.write_information(writer);
    }

    fn initial_estimate_possible(
        &self,
        known: &NodeSet,
        target: NodeId,
        nodes: &NodeArena,
    ) -> f64 {
        let usable = nodes
            .parameter(self.parameter())
            .ok()
            .and_then(|parameter| parameter.interpretation())
            .is_some_and(|interpretation| self.accepted.contains(&interpretation));
        if self.scale_inversion == ScaleInversion::Negate || !usable {
            return CANNOT_INITIALIZE;
        }
        relative_pose_score(self.poses(), Some(self.parameter()), known, target)
    }

    fn initial_estimate(
        &self,
        known: &NodeSet,
        target: NodeId,
        nodes: &mut NodeArena,
    ) -> EdgeResult<()> {
        if self.scale_inversion == ScaleInversion::Negate {
            return Err(EdgeError::CannotInitialize {
                tag: self.tag,
                target,
            });
        }
        let parameter = nodes.parameter(self.parameter())?;
        let interpretation =
            parameter
                .interpretation()
                .ok_or(EdgeError::UnsetInterpretation {
                    tag: self.tag,
                    node: self.parameter(),
                })?;
        self.check_accepted(Some(interpretation))?;
        let delta = interpretation.compose(
            self.measurement.measurement(),
            &parameter.to_vector3(),
            false,
            self.scale_inversion,
        );
        propagate_pose(self.tag, self.poses(), &delta, known, target, nodes)
    }

    fn parameter_requirement(&self) -> Option<(NodeId, &'static [Interpretation])> {
        Some((self.parameter(), self.accepted))
    }
}

/// Residual with the interpretation stored in the edge record.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedEdge {
    tag: &'static str,
    interpretation: Option<Interpretation>,
    accepted: &'static [Interpretation],
    endpoints: Endpoints<3>,
    measurement: PoseMeasurement,
    error: Vector3<f64>,
}

impl TaggedEdge {
    pub const PSE2_TAG: &'static str = "CONSTRAINT_POSES2D_SE2_PSE2";
    pub const PV2_TAG: &'static str = "CONSTRAINT_POSES2D_SE2_PV2";

    /// Rigid parameter read as bias or offset.
    pub fn pse2() -> Self {
        Self {
            tag: Self::PSE2_TAG,
            interpretation: None,
            accepted: &[Interpretation::Bias, Interpretation::Offset],
            endpoints: Endpoints::default(),
            measurement: PoseMeasurement::default(),
            error: Vector3::zeros(),
        }
    }

    /// Two-axis scale parameter.
    pub fn pv2() -> Self {
        Self {
            tag: Self::PV2_TAG,
            accepted: &[Interpretation::Scale],
            ..Self::pse2()
        }
    }

    pub fn between(mut self, pose1: NodeId, pose2: NodeId, parameter: NodeId) -> Self {
        self.endpoints = Endpoints::new([pose1, pose2, parameter]);
        self
    }

    pub fn with_measurement(mut self, measurement: SE2) -> Self {
        self.measurement.set_measurement(measurement);
        self
    }

    pub fn with_information(mut self, information: Matrix3<f64>) -> Self {
        self.measurement.set_information(information);
        self
    }

    /// Set the interpretation this edge assigns to its parameter node.
    /// Returns `false` for interpretations this edge type does not accept.
    pub fn set_interpretation(&mut self, interpretation: Interpretation) -> bool {
        if !self.accepted.contains(&interpretation) {
            warn!(
                "{}: interpretation {} not accepted, ignored",
                self.tag, interpretation
            );
            return false;
        }
        self.interpretation = Some(interpretation);
        true
    }

    pub fn with_interpretation(mut self, interpretation: Interpretation) -> Self {
        self.set_interpretation(interpretation);
        self
    }

    pub fn interpretation(&self) -> Option<Interpretation> {
        self.interpretation
    }

    pub fn measurement(&self) -> &PoseMeasurement {
        &self.measurement
    }

    fn poses(&self) -> [NodeId; 2] {
        let [pose1, pose2, _] = *self.endpoints.ids();
        [pose1, pose2]
    }

    fn parameter(&self) -> NodeId {
        self.endpoints.ids()[2]
    }

    /// Model of `delta`, or its inverse when `inverse` is set.
    fn model(
        interpretation: Interpretation,
        transform: &SE2,
        parameter: &Vector3<f64>,
        inverse: bool,
    ) -> SE2 {
        let apply_inverse = match interpretation {
            Interpretation::Offset => !inverse,
            Interpretation::Bias | Interpretation::Scale => inverse,
        };
        interpretation.compose(
            transform,
            parameter,
            apply_inverse,
            ScaleInversion::Reciprocal,
        )
    }
}

impl Edge for TaggedEdge {
    fn tag(&self) -> &'static str {
        self.tag
    }

    fn vertices(&self) -> &[NodeId] {
        self.endpoints.as_slice()
    }

    fn vertex_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Pose, NodeKind::Pose, NodeKind::Parameter]
    }

    fn set_vertices(&mut self, vertices: &[NodeId]) -> EdgeResult<()> {
        self.endpoints.set(self.tag, vertices)
    }

    fn compute_error(&mut self, nodes: &NodeArena) -> EdgeResult<()> {
        let [pose1, pose2] = self.poses();
        let delta = pose_delta(nodes, pose1, pose2)?;
        let parameter = nodes.parameter(self.parameter())?;
        let model = match parameter.interpretation() {
            Some(interpretation) => {
                Self::model(interpretation, &delta, &parameter.to_vector3(), false)
            }
            None => {
                warn!(
                    "{}: parameter interpretation not set, transform passed through unchanged",
                    self.tag
                );
                delta
            }
        };
        self.error = self.measurement.residual(&model);
        Ok(())
    }

    fn error(&self) -> &Vector3<f64> {
        &self.error
    }

    fn information(&self) -> Matrix3<f64> {
        *self.measurement.information()
    }

    fn read_fields(&mut self, reader: &mut RecordReader<'_>) -> IoResult<()> {
        self.measurement.read_measurement(reader)?;
        let tag = reader.read_token("interpretation")?;
        match Interpretation::parse(tag) {
            Some(interpretation) => {
                self.set_interpretation(interpretation);
            }
            None => warn!("{}: unknown interpretation tag {:?} ignored", self.tag, tag),
        }
        self.measurement.read_information(reader)
    }

    fn write(&self, writer: &mut RecordWriter) {
        self.measurement.write_measurement(writer);
        writer.write_token(self.interpretation.map_or(UNSET_TAG, Interpretation::tag));
        self.measurement.write_information(writer);
    }

    fn initial_estimate_possible(
        &self,
        known: &NodeSet,
        target: NodeId,
        nodes: &NodeArena,
    ) -> f64 {
        if !has_interpretation(nodes, self.parameter()) {
            return CANNOT_INITIALIZE;
        }
        relative_pose_score(self.poses(), Some(self.parameter()), known, target)
    }

    fn initial_estimate(
        &self,
        known: &NodeSet,
        target: NodeId,
        nodes: &mut NodeArena,
    ) -> EdgeResult<()> {
        let parameter = nodes.parameter(self.parameter())?;
        let interpretation =
            parameter
                .interpretation()
                .ok_or(EdgeError::UnsetInterpretation {
                    tag: self.tag,
                    node: self.parameter(),
                })?;
        let delta = Self::model(
            interpretation,
            self.measurement.measurement(),
            &parameter.to_vector3(),
            true,
        );
        propagate_pose(self.tag, self.poses(), &delta, known, target, nodes)
    }

    fn parameter_binding(&self) -> Option<(NodeId, Interpretation)> {
        self.interpretation
            .map(|interpretation| (self.parameter(), interpretation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::node::PoseNode,
        manifold::LieGroup,
        parameters::{HasEstimate, ParameterNode, ParameterValue},
    };
    use nalgebra::Vector2;
    use std::{error::Error, f64::consts::FRAC_PI_2};

    const TOLERANCE: f64 = 1e-9;

    fn arena(parameter: ParameterNode, pose2: SE2) -> Result<NodeArena, Box<dyn Error>> {
        let mut nodes = NodeArena::new();
        nodes.insert(NodeId(0), PoseNode::new(SE2::identity()).into())?;
        nodes.insert(NodeId(1), PoseNode::new(pose2).into())?;
        nodes.insert(NodeId(2), parameter.into())?;
        Ok(nodes)
    }

    fn known() -> NodeSet {
        [NodeId(0), NodeId(2)].into_iter().collect()
    }

    #[test]
    fn test_pse2_uses_node_interpretation() -> Result<(), Box<dyn Error>> {
        let parameter = ParameterNode::se2()
            .with_interpretation(Interpretation::Bias)?
            .with_value(ParameterValue::Se2(SE2::from_xy_angle(1.0, 0.0, 0.0)))?;
        let mut nodes = arena(parameter, SE2::identity())?;
        let mut edge = InterpretedEdge::pse2()
            .between(NodeId(0), NodeId(1), NodeId(2))
            .with_measurement(SE2::from_xy_angle(2.0, 0.0, 0.0));

        assert_eq!(edge.initial_estimate_possible(&known(), NodeId(1), &nodes), 1.0);
        edge.initial_estimate(&known(), NodeId(1), &mut nodes)?;
        let pose2 = nodes.pose(NodeId(1))?.estimate();
        assert!((pose2.to_vector() - Vector3::new(3.0, 0.0, 0.0)).norm() < TOLERANCE);

        edge.compute_error(&nodes)?;
        assert!(edge.error().norm() < TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_pv3_scale_reciprocal() -> Result<(), Box<dyn Error>> {
        let parameter = ParameterNode::v3()
            .with_interpretation(Interpretation::Scale)?
            .with_value(ParameterValue::Vector3(Vector3::new(2.0, 2.0, 1.0)))?;
        let nodes = arena(parameter, SE2::from_xy_angle(2.0, 4.0, 0.25))?;
        let mut edge = InterpretedEdge::pv3()
            .between(NodeId(0), NodeId(1), NodeId(2))
            .with_measurement(SE2::from_xy_angle(1.0, 2.0, 0.25));
        edge.compute_error(&nodes)?;
        assert!(edge.error().norm() < TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_pv3_refuses_bias_parameter() -> Result<(), Box<dyn Error>> {
        let parameter = ParameterNode::v3().with_interpretation(Interpretation::Bias)?;
        let nodes = arena(parameter, SE2::from_xy_angle(1.0, 0.0, 0.0))?;
        let mut edge = InterpretedEdge::pv3().between(NodeId(0), NodeId(1), NodeId(2));
        assert!(matches!(
            edge.compute_error(&nodes),
            Err(EdgeError::RejectedInterpretation {
                interpretation: Interpretation::Bias,
                ..
            })
        ));
        assert_eq!(edge.initial_estimate_possible(&known(), NodeId(1), &nodes), -1.0);
        assert_eq!(
            edge.parameter_requirement(),
            Some((NodeId(2), &[Interpretation::Scale][..]))
        );
        Ok(())
    }

    #[test]
    fn test_generic_edges_use_negated_scale() -> Result<(), Box<dyn Error>> {
        // scale (1, 1, 1) under negation maps [x, y, θ] to [-x, -y, -θ]
        let parameter = ParameterNode::v3()
            .with_interpretation(Interpretation::Scale)?
            .with_value(ParameterValue::Vector3(Vector3::new(1.0, 1.0, 1.0)))?;
        let nodes = arena(parameter, SE2::from_xy_angle(1.0, 2.0, 0.5))?;
        let mut edge = InterpretedEdge::v3()
            .between(NodeId(0), NodeId(1), NodeId(2))
            .with_measurement(SE2::from_xy_angle(-1.0, -2.0, -0.5));
        edge.compute_error(&nodes)?;
        assert!(edge.error().norm() < TOLERANCE);

        assert_eq!(edge.initial_estimate_possible(&known(), NodeId(1), &nodes), -1.0);
        Ok(())
    }

    #[test]
    fn test_v1_bias_on_one_axis() -> Result<(), Box<dyn Error>> {
        let parameter = ParameterNode::v1()
            .with_interpretation(Interpretation::Bias)?
            .with_value(ParameterValue::Scalar(0.5))?
            .with_axis(1)?;
        // delta ∘ SE2(0, -0.5, 0) == measurement
        let nodes = arena(parameter, SE2::from_xy_angle(1.0, 0.5, 0.0))?;
        let mut edge = InterpretedEdge::v1()
            .between(NodeId(0), NodeId(1), NodeId(2))
            .with_measurement(SE2::from_xy_angle(1.0, 0.0, 0.0));
        edge.compute_error(&nodes)?;
        assert!(edge.error().norm() < TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_unset_interpretation_passes_through() -> Result<(), Box<dyn Error>> {
        let nodes = arena(ParameterNode::se2(), SE2::from_xy_angle(2.0, 0.0, 0.0))?;
        let mut edge = InterpretedEdge::se2()
            .between(NodeId(0), NodeId(1), NodeId(2))
            .with_measurement(SE2::from_xy_angle(2.0, 0.0, 0.0));
        edge.compute_error(&nodes)?;
        assert!(edge.error().norm() < TOLERANCE);

        let mut nodes = nodes;
        let result = InterpretedEdge::pse2()
            .between(NodeId(0), NodeId(1), NodeId(2))
            .initial_estimate(&known(), NodeId(1), &mut nodes);
        assert!(matches!(
            result,
            Err(EdgeError::UnsetInterpretation { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_tagged_bias_applied_forward() -> Result<(), Box<dyn Error>> {
        let parameter = ParameterNode::se2()
            .untagged()
            .with_interpretation(Interpretation::Bias)?
            .with_value(ParameterValue::Se2(SE2::from_xy_angle(1.0, 0.0, 0.0)))?;
        // delta ∘ b == measurement with delta = (1, 0, 0)
        let mut nodes = arena(parameter, SE2::from_xy_angle(1.0, 0.0, 0.0))?;
        let mut edge = TaggedEdge::pse2()
            .with_interpretation(Interpretation::Bias)
            .between(NodeId(0), NodeId(1), NodeId(2))
            .with_measurement(SE2::from_xy_angle(2.0, 0.0, 0.0));
        edge.compute_error(&nodes)?;
        assert!(edge.error().norm() < TOLERANCE);

        nodes.pose_mut(NodeId(1))?.set_estimate(SE2::identity())?;
        edge.initial_estimate(&known(), NodeId(1), &mut nodes)?;
        let pose2 = nodes.pose(NodeId(1))?.estimate();
        assert!((pose2.to_vector() - Vector3::new(1.0, 0.0, 0.0)).norm() < TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_tagged_offset_round_trip() -> Result<(), Box<dyn Error>> {
        let offset = SE2::from_xy_angle(0.2, -0.1, FRAC_PI_2);
        let parameter = ParameterNode::se2()
            .untagged()
            .with_interpretation(Interpretation::Offset)?
            .with_value(ParameterValue::Se2(offset))?;
        let mut nodes = arena(parameter, SE2::identity())?;
        let mut edge = TaggedEdge::pse2()
            .with_interpretation(Interpretation::Offset)
            .between(NodeId(0), NodeId(1), NodeId(2))
            .with_measurement(SE2::from_xy_angle(1.0, 0.5, 0.3));

        edge.initial_estimate(&known(), NodeId(1), &mut nodes)?;
        edge.compute_error(&nodes)?;
        assert!(edge.error().norm() < TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_tagged_pv2_scales_translation_only() -> Result<(), Box<dyn Error>> {
        let parameter = ParameterNode::v2()
            .untagged()
            .scale_only()
            .with_interpretation(Interpretation::Scale)?
            .with_value(ParameterValue::Vector2(Vector2::new(2.0, 0.5)))?;
        let nodes = arena(parameter, SE2::from_xy_angle(1.0, 4.0, 0.3))?;
        let mut edge = TaggedEdge::pv2()
            .with_interpretation(Interpretation::Scale)
            .between(NodeId(0), NodeId(1), NodeId(2))
            .with_measurement(SE2::from_xy_angle(2.0, 2.0, 0.3));
        edge.compute_error(&nodes)?;
        assert!(edge.error().norm() < TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_tagged_record() -> Result<(), Box<dyn Error>> {
        let mut edge = TaggedEdge::pse2();
        edge.read(&mut RecordReader::new("1 0 0 OFFSET 1 0 0 1 0 1"))?;
        assert_eq!(edge.interpretation(), Some(Interpretation::Offset));
        assert_eq!(edge.information(), Matrix3::identity());

        let mut writer = RecordWriter::new();
        edge.write(&mut writer);
        assert_eq!(writer.as_str(), "1 0 0 OFFSET 1 0 0 1 0 1");

        edge.set_vertices(&[NodeId(4), NodeId(5), NodeId(6)])?;
        assert_eq!(
            edge.parameter_binding(),
            Some((NodeId(6), Interpretation::Offset))
        );

        // scale is not a rigid interpretation, the token is consumed and ignored
        let mut edge = TaggedEdge::pse2();
        edge.read(&mut RecordReader::new("1 0 0 SCALE 1 0 0 1 0 1"))?;
        assert_eq!(edge.interpretation(), None);
        assert_eq!(edge.parameter_binding(), None);
        Ok(())
    }

    #[test]
    fn test_tagged_record_ending_before_tag() -> Result<(), Box<dyn Error>> {
        let mut edge = TaggedEdge::pv2();
        edge.read(&mut RecordReader::new("1 0 0"))?;
        assert_eq!(edge.interpretation(), None);
        assert_eq!(edge.information(), Matrix3::identity());
        assert!(
            edge.measurement()
                .measurement()
                .is_approx(&SE2::from_xy_angle(1.0, 0.0, 0.0), 1e-12)
        );
        Ok(())
    }
}
