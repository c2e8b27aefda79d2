//! Relative-pose constraints weighted per axis by a variance node.
//!
//! `d = (measurement⁻¹ ∘ delta).to_vector()` and
//! `error[i] = sqrt(w[i]) · d[i]`, where `w` is the variance node estimate
//! read as an information diagonal. Both record schemas have a variant of
//! this edge; they differ only in their tag. The record holds the
//! measurement only; the weight lives in the graph.

use crate::{
    core::{NodeId, NodeKind, graph::NodeArena},
    edges::{Edge, EdgeResult, Endpoints, PoseMeasurement, pose_delta},
    io::record::{IoResult, RecordReader, RecordWriter},
    manifold::se2::SE2,
    parameters::HasEstimate,
};
use nalgebra::Vector3;

#[derive(Debug, Clone, PartialEq)]
pub struct VarianceWeightedEdge {
    tag: &'static str,
    endpoints: Endpoints<3>,
    measurement: PoseMeasurement,
    error: Vector3<f64>,
}

impl VarianceWeightedEdge {
    pub const INFO_TAG: &'static str = "CONSTRAINT_POSES2D_SE2_I";
    pub const COV_TAG: &'static str = "CONSTRAINT_POSES2D_SE2_COV";

    fn with_tag(tag: &'static str) -> Self {
        Self {
            tag,
            endpoints: Endpoints::default(),
            measurement: PoseMeasurement::default(),
            error: Vector3::zeros(),
        }
    }

    /// `CONSTRAINT_POSES2D_SE2_I`, node-tagged schema
    pub fn info() -> Self {
        Self::with_tag(Self::INFO_TAG)
    }

    /// `CONSTRAINT_POSES2D_SE2_COV`, edge-tagged schema
    pub fn cov() -> Self {
        Self::with_tag(Self::COV_TAG)
    }

    pub fn between(mut self, pose1: NodeId, pose2: NodeId, variance: NodeId) -> Self {
        self.endpoints = Endpoints::new([pose1, pose2, variance]);
        self
    }

    pub fn with_measurement(mut self, measurement: SE2) -> Self {
        self.measurement.set_measurement(measurement);
        self
    }

    pub fn measurement(&self) -> &PoseMeasurement {
        &self.measurement
    }
}

impl Edge for VarianceWeightedEdge {
    fn tag(&self) -> &'static str {
        self.tag
    }

    fn vertices(&self) -> &[NodeId] {
        self.endpoints.as_slice()
    }

    fn vertex_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Pose, NodeKind::Pose, NodeKind::Variance]
    }

    fn set_vertices(&mut self, vertices: &[NodeId]) -> EdgeResult<()> {
        self.endpoints.set(self.tag, vertices)
    }

    fn compute_error(&mut self, nodes: &NodeArena) -> EdgeResult<()> {
        let [pose1, pose2, variance] = *self.endpoints.ids();
        let delta = pose_delta(nodes, pose1, pose2)?;
        let weights = nodes.variance(variance)?.estimate();
        let d = self.measurement.residual(&delta);
        self.error = weights.map(f64::sqrt).component_mul(&d);
        Ok(())
    }

    fn error(&self) -> &Vector3<f64> {
        &self.error
    }

    fn read_fields(&mut self, reader: &mut RecordReader<'_>) -> IoResult<()> {
        self.measurement.read_measurement(reader)
    }

    fn write(&self, writer: &mut RecordWriter) {
        self.measurement.write_measurement(writer);
    }
}
