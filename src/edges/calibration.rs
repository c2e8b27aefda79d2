//! Relative-pose constraints corrected by a calibration parameter whose
//! meaning is fixed by the edge type:
//!
//! | Tag                            | Model of `delta = pose1⁻¹ ∘ pose2` |
//! | ------------------------------ | ---------------------------------- |
//! | `CONSTRAINT_POSES2D_SE2_BIAS`  | `delta ∘ b⁻¹`                      |
//! | `CONSTRAINT_POSES2D_SE2_OFFSET`| `o⁻¹ ∘ delta ∘ o`                  |
//! | `CONSTRAINT_POSES2D_SE2_SCALE` | `SE2(vec(delta) / s)`              |
//!
//! and `error = measurement⁻¹ ∘ model`. Scale inversion is the
//! component-wise reciprocal, so every model here is invertible and these
//! edges can bootstrap the missing pose.

use crate::{
    core::{NodeId, NodeKind, NodeSet, graph::NodeArena},
    edges::{
        Edge, EdgeResult, Endpoints, PoseMeasurement, pose_delta, propagate_pose,
        relative_pose_score,
    },
    io::record::{IoResult, RecordReader, RecordWriter},
    manifold::se2::SE2,
    parameters::{Interpretation, ScaleInversion},
};
use nalgebra::{Matrix3, Vector3};

const SCALE_INVERSION: ScaleInversion = ScaleInversion::Reciprocal;

#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationEdge {
    interpretation: Interpretation,
    endpoints: Endpoints<3>,
    measurement: PoseMeasurement,
    error: Vector3<f64>,
}

impl CalibrationEdge {
    pub const BIAS_TAG: &'static str = "CONSTRAINT_POSES2D_SE2_BIAS";
    pub const OFFSET_TAG: &'static str = "CONSTRAINT_POSES2D_SE2_OFFSET";
    pub const SCALE_TAG: &'static str = "CONSTRAINT_POSES2D_SE2_SCALE";

    pub fn new(interpretation: Interpretation) -> Self {
        Self {
            interpretation,
            endpoints: Endpoints::default(),
            measurement: PoseMeasurement::default(),
            error: Vector3::zeros(),
        }
    }

    pub fn bias() -> Self {
        Self::new(Interpretation::Bias)
    }

    pub fn offset() -> Self {
        Self::new(Interpretation::Offset)
    }

    pub fn scale() -> Self {
        Self::new(Interpretation::Scale)
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

    pub fn interpretation(&self) -> Interpretation {
        self.interpretation
    }

    pub fn measurement(&self) -> &PoseMeasurement {
        &self.measurement
    }

    pub fn set_measurement(&mut self, measurement: SE2) {
        self.measurement.set_measurement(measurement);
    }

    fn poses(&self) -> [NodeId; 2] {
        let [pose1, pose2, _] = *self.endpoints.ids();
        [pose1, pose2]
    }

    fn parameter(&self) -> NodeId {
        self.endpoints.ids()[2]
    }
}

impl Edge for CalibrationEdge {
    fn tag(&self) -> &'static str {
        match self.interpretation {
            Interpretation::Bias => Self::BIAS_TAG,
            Interpretation::Offset => Self::OFFSET_TAG,
            Interpretation::Scale => Self::SCALE_TAG,
        }
    }

    fn vertices(&self) -> &[NodeId] {
        self.endpoints.as_slice()
    }

    fn vertex_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Pose, NodeKind::Pose, NodeKind::Parameter]
    }

    fn set_vertices(&mut self, vertices: &[NodeId]) -> EdgeResult<()> {
        self.endpoints.set(self.tag(), vertices)
    }

    fn compute_error(&mut self, nodes: &NodeArena) -> EdgeResult<()> {
        let [pose1, pose2] = self.poses();
        let delta = pose_delta(nodes, pose1, pose2)?;
        let parameter = nodes.parameter(self.parameter())?.to_vector3();
        let model = self
            .interpretation
            .compose(&delta, &parameter, true, SCALE_INVERSION);
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
        _nodes: &NodeArena,
    ) -> f64 {
        relative_pose_score(self.poses(), Some(self.parameter()), known, target)
    }

    /// The relative motion that zeroes the residual is the forward model
    /// applied to the measurement.
    fn initial_estimate(
        &self,
        known: &NodeSet,
        target: NodeId,
        nodes: &mut NodeArena,
    ) -> EdgeResult<()> {
        let parameter = nodes.parameter(self.parameter())?.to_vector3();
        let delta = self.interpretation.compose(
            self.measurement.measurement(),
            &parameter,
            false,
            SCALE_INVERSION,
        );
        propagate_pose(self.tag(), self.poses(), &delta, known, target, nodes)
    }
}
