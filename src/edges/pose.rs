//! Plain relative-pose constraint (`CONSTRAINT_POSES2D_SE2`).

use crate::{
    core::{NodeId, NodeKind, NodeSet, graph::NodeArena},
    edges::{
        Edge, EdgeResult, Endpoints, PoseMeasurement, pose_delta, propagate_pose,
        relative_pose_score,
    },
    io::record::{IoResult, RecordReader, RecordWriter},
    manifold::se2::SE2,
};
use nalgebra::{Matrix3, Vector3};

/// `error = measurement⁻¹ ∘ (pose1⁻¹ ∘ pose2)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseEdge {
    endpoints: Endpoints<2>,
    measurement: PoseMeasurement,
    error: Vector3<f64>,
}

impl PoseEdge {
    pub const TAG: &'static str = "CONSTRAINT_POSES2D_SE2";

    pub fn new(pose1: NodeId, pose2: NodeId, measurement: SE2) -> Self {
        Self {
            endpoints: Endpoints::new([pose1, pose2]),
            measurement: PoseMeasurement::new(measurement),
            error: Vector3::zeros(),
        }
    }

    pub fn with_information(mut self, information: Matrix3<f64>) -> Self {
        self.measurement.set_information(information);
        self
    }

    pub fn measurement(&self) -> &PoseMeasurement {
        &self.measurement
    }

    pub fn set_measurement(&mut self, measurement: SE2) {
        self.measurement.set_measurement(measurement);
    }
}

impl Edge for PoseEdge {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn vertices(&self) -> &[NodeId] {
        self.endpoints.as_slice()
    }

    fn vertex_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Pose, NodeKind::Pose]
    }

    fn set_vertices(&mut self, vertices: &[NodeId]) -> EdgeResult<()> {
        self.endpoints.set(Self::TAG, vertices)
    }

    fn compute_error(&mut self, nodes: &NodeArena) -> EdgeResult<()> {
        let [pose1, pose2] = *self.endpoints.ids();
        let delta = pose_delta(nodes, pose1, pose2)?;
        self.error = self.measurement.residual(&delta);
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
        relative_pose_score(*self.endpoints.ids(), None, known, target)
    }

    fn initial_estimate(
        &self,
        known: &NodeSet,
        target: NodeId,
        nodes: &mut NodeArena,
    ) -> EdgeResult<()> {
        propagate_pose(
            Self::TAG,
            *self.endpoints.ids(),
            self.measurement.measurement(),
            known,
            target,
            nodes,
        )
    }
}
