//! Calibration edges
//!
//! An edge reads the current estimates of its endpoint nodes and writes a
//! 3-dimensional error vector into its own buffer. Edges never modify a
//! node while computing an error; the only node they ever write is the one
//! they are asked to initialize during bootstrapping.
//!
//! Families:
//! - [`pose::PoseEdge`]: plain relative-pose constraint between two poses
//! - [`calibration::CalibrationEdge`]: relative pose corrected by a bias,
//!   offset or scale parameter whose meaning is fixed by the edge type
//! - [`interpreted::InterpretedEdge`]: same, with the meaning taken from the
//!   parameter node
//! - [`interpreted::TaggedEdge`]: same, with the meaning stored in the edge
//!   record and assigned to the parameter node on load
//! - [`variance::VarianceWeightedEdge`]: relative pose weighted per axis by
//!   a variance node
//! - [`info3::AdaptiveInfoEdge`]: consistency signal between a variance node
//!   and a locally stored minimum deviation

pub mod calibration;
pub mod info3;
pub mod interpreted;
pub mod pose;
pub mod variance;

use crate::{
    core::{CoreError, NodeId, NodeKind, NodeSet, graph::NodeArena},
    io::record::{IoResult, RecordReader, RecordWriter, end_of_record},
    manifold::{LieGroup, se2::SE2},
    parameters::{HasEstimate, HasInterpretation, Interpretation},
};
use nalgebra::{Matrix3, Vector3};
use std::fmt;
use thiserror::Error;
use tracing::error;

pub use calibration::CalibrationEdge;
pub use info3::AdaptiveInfoEdge;
pub use interpreted::{InterpretedEdge, TaggedEdge};
pub use pose::PoseEdge;
pub use variance::VarianceWeightedEdge;

/// Score returned by [`Edge::initial_estimate_possible`] when the edge cannot help.
pub const CANNOT_INITIALIZE: f64 = -1.0;

/// Score returned by [`Edge::initial_estimate_possible`] when the edge can initialize the target.
pub const CAN_INITIALIZE: f64 = 1.0;

/// Edge module errors
#[derive(Debug, Clone, Error)]
pub enum EdgeError {
    /// Structural errors from node access
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The parameter node has no interpretation, so the model cannot be inverted
    #[error("{tag}: parameter node {node} has no interpretation")]
    UnsetInterpretation { tag: &'static str, node: NodeId },

    /// The parameter node's interpretation is not one this edge type evaluates
    #[error("{tag}: parameter node {node} has interpretation {interpretation}, which this edge cannot apply")]
    RejectedInterpretation {
        tag: &'static str,
        node: NodeId,
        interpretation: Interpretation,
    },

    /// Bootstrapping was requested for a node this edge cannot initialize
    #[error("{tag}: cannot initialize node {target} from the known nodes")]
    CannotInitialize { tag: &'static str, target: NodeId },

    /// Residual evaluation produced NaN or Inf entries
    #[error("Degenerate residuals in {count} edge(s)")]
    DegenerateResidual { count: usize },
}

impl EdgeError {
    /// Log the error with tracing::error and return self for chaining
    #[must_use]
    pub fn log(self) -> Self {
        error!("{}", self);
        self
    }

    /// Log the error together with the error that caused it
    #[must_use]
    pub fn log_with_source<E: std::fmt::Debug>(self, source_error: E) -> Self {
        error!("{} | Source: {:?}", self, source_error);
        self
    }
}

/// Result type for edge operations
pub type EdgeResult<T> = Result<T, EdgeError>;

/// Capability interface of every edge.
pub trait Edge: fmt::Debug + Send + Sync {
    /// Record tag this edge is written with.
    fn tag(&self) -> &'static str;

    /// Endpoint handles, in record order.
    fn vertices(&self) -> &[NodeId];

    /// Node kind expected at each endpoint.
    fn vertex_kinds(&self) -> &'static [NodeKind];

    fn set_vertices(&mut self, vertices: &[NodeId]) -> EdgeResult<()>;

    /// Recompute the error buffer from the current node estimates.
    fn compute_error(&mut self, nodes: &NodeArena) -> EdgeResult<()>;

    /// Error buffer written by the last [`Edge::compute_error`].
    fn error(&self) -> &Vector3<f64>;

    fn information(&self) -> Matrix3<f64> {
        Matrix3::identity()
    }

    /// Read the record fields in order. Implementations stop at the first
    /// missing field; [`Edge::read`] decides what that means.
    fn read_fields(&mut self, reader: &mut RecordReader<'_>) -> IoResult<()>;

    /// Read the record. A record that ends early keeps the defaults of the
    /// fields it does not reach; malformed tokens are errors.
    fn read(&mut self, reader: &mut RecordReader<'_>) -> IoResult<()> {
        end_of_record(self.read_fields(reader))
    }

    fn write(&self, writer: &mut RecordWriter);

    /// [`CAN_INITIALIZE`] if this edge can compute `target` from the nodes in
    /// `known`, [`CANNOT_INITIALIZE`] otherwise. `nodes` is only read.
    fn initial_estimate_possible(
        &self,
        _known: &NodeSet,
        _target: NodeId,
        _nodes: &NodeArena,
    ) -> f64 {
        CANNOT_INITIALIZE
    }

    /// Write an estimate for `target`. Only `target` is modified.
    fn initial_estimate(
        &self,
        _known: &NodeSet,
        target: NodeId,
        _nodes: &mut NodeArena,
    ) -> EdgeResult<()> {
        Err(EdgeError::CannotInitialize {
            tag: self.tag(),
            target,
        })
    }

    /// True if the last error contains NaN or Inf.
    fn is_degenerate(&self) -> bool {
        self.error().iter().any(|v| !v.is_finite())
    }

    /// Interpretation this edge assigns to one of its parameter nodes when
    /// it is added to a graph.
    fn parameter_binding(&self) -> Option<(NodeId, Interpretation)> {
        None
    }

    /// Parameter node whose own interpretation this edge applies, with the
    /// interpretations the edge can evaluate. Checked when the edge is added.
    fn parameter_requirement(&self) -> Option<(NodeId, &'static [Interpretation])> {
        None
    }
}

/// Fixed-size endpoint list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints<const N: usize>([NodeId; N]);

impl<const N: usize> Default for Endpoints<N> {
    fn default() -> Self {
        Self([NodeId(0); N])
    }
}

impl<const N: usize> Endpoints<N> {
    pub fn new(ids: [NodeId; N]) -> Self {
        Self(ids)
    }

    pub fn ids(&self) -> &[NodeId; N] {
        &self.0
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.0
    }

    pub fn set(&mut self, tag: &'static str, vertices: &[NodeId]) -> EdgeResult<()> {
        let ids: [NodeId; N] = vertices.try_into().map_err(|_| {
            EdgeError::from(CoreError::Arity {
                tag: tag.to_string(),
                expected: N,
                actual: vertices.len(),
            })
        })?;
        self.0 = ids;
        Ok(())
    }
}

/// Relative-pose measurement with its cached inverse and information matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseMeasurement {
    measurement: SE2,
    inverse: SE2,
    information: Matrix3<f64>,
}

impl Default for PoseMeasurement {
    fn default() -> Self {
        Self::new(SE2::identity())
    }
}

impl PoseMeasurement {
    pub fn new(measurement: SE2) -> Self {
        Self {
            measurement,
            inverse: measurement.inverse(),
            information: Matrix3::identity(),
        }
    }

    pub fn measurement(&self) -> &SE2 {
        &self.measurement
    }

    pub fn inverse(&self) -> &SE2 {
        &self.inverse
    }

    pub fn information(&self) -> &Matrix3<f64> {
        &self.information
    }

    pub fn set_measurement(&mut self, measurement: SE2) {
        self.measurement = measurement;
        self.inverse = measurement.inverse();
    }

    pub fn set_information(&mut self, information: Matrix3<f64>) {
        self.information = information;
    }

    /// `measurement⁻¹ ∘ model` in vector form.
    pub fn residual(&self, model: &SE2) -> Vector3<f64> {
        self.inverse.compose(model).to_vector()
    }

    pub fn read_measurement(&mut self, reader: &mut RecordReader<'_>) -> IoResult<()> {
        let measurement = reader.read_se2("measurement")?;
        self.set_measurement(measurement);
        Ok(())
    }

    pub fn read_information(&mut self, reader: &mut RecordReader<'_>) -> IoResult<()> {
        self.information = reader.read_information()?;
        Ok(())
    }

    pub fn write_measurement(&self, writer: &mut RecordWriter) {
        writer.write_se2(&self.measurement);
    }

    pub fn write_information(&self, writer: &mut RecordWriter) {
        writer.write_information(&self.information);
    }
}

/// `pose1⁻¹ ∘ pose2` for the two pose endpoints.
pub(crate) fn pose_delta(nodes: &NodeArena, pose1: NodeId, pose2: NodeId) -> EdgeResult<SE2> {
    let pose1 = nodes.pose(pose1)?.estimate();
    let pose2 = nodes.pose(pose2)?.estimate();
    Ok(pose1.between(&pose2))
}

/// Bootstrapping score for an edge between two poses, optionally requiring
/// a known parameter node.
pub(crate) fn relative_pose_score(
    poses: [NodeId; 2],
    parameter: Option<NodeId>,
    known: &NodeSet,
    target: NodeId,
) -> f64 {
    if parameter.is_some_and(|p| !known.contains(&p)) {
        return CANNOT_INITIALIZE;
    }
    let [pose1, pose2] = poses;
    let forward = target == pose2 && known.contains(&pose1) && !known.contains(&pose2);
    let backward = target == pose1 && known.contains(&pose2) && !known.contains(&pose1);
    if pose1 != pose2 && (forward || backward) {
        CAN_INITIALIZE
    } else {
        CANNOT_INITIALIZE
    }
}

/// Whether `parameter` is a parameter node with its interpretation set.
pub(crate) fn has_interpretation(nodes: &NodeArena, parameter: NodeId) -> bool {
    nodes
        .parameter(parameter)
        .is_ok_and(|node| node.interpretation().is_some())
}

/// Write the unknown pose endpoint from the known one and the relative
/// motion `delta` that zeroes the residual.
pub(crate) fn propagate_pose(
    tag: &'static str,
    poses: [NodeId; 2],
    delta: &SE2,
    known: &NodeSet,
    target: NodeId,
    nodes: &mut NodeArena,
) -> EdgeResult<()> {
    let [pose1, pose2] = poses;
    if target == pose2 && known.contains(&pose1) {
        let from = nodes.pose(pose1)?.estimate();
        nodes.pose_mut(pose2)?.set_estimate(from.compose(delta))?;
    } else if target == pose1 && known.contains(&pose2) {
        let from = nodes.pose(pose2)?.estimate();
        nodes.pose_mut(pose1)?.set_estimate(from.compose(&delta.inverse()))?;
    } else {
        return Err(EdgeError::CannotInitialize { tag, target });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_caches_inverse() {
        let mut measurement = PoseMeasurement::new(SE2::from_xy_angle(1.0, 2.0, 0.3));
        assert!(
            measurement
                .measurement()
                .compose(measurement.inverse())
                .is_approx(&SE2::identity(), 1e-12)
        );

        measurement.set_measurement(SE2::from_xy_angle(-3.0, 0.5, -1.2));
        assert!(
            measurement
                .inverse()
                .is_approx(&SE2::from_xy_angle(-3.0, 0.5, -1.2).inverse(), 1e-12)
        );
        assert!(measurement.residual(measurement.measurement()).norm() < 1e-12);
    }

    #[test]
    fn test_measurement_read_replaces_inverse() -> Result<(), Box<dyn std::error::Error>> {
        let mut measurement = PoseMeasurement::default();
        measurement.read_measurement(&mut RecordReader::new("2 0 0"))?;
        assert!(
            measurement
                .inverse()
                .is_approx(&SE2::from_xy_angle(-2.0, 0.0, 0.0), 1e-12)
        );
        Ok(())
    }

    #[test]
    fn test_endpoints_arity() {
        let mut endpoints = Endpoints::<3>::default();
        assert!(
            endpoints
                .set("TEST", &[NodeId(1), NodeId(2), NodeId(3)])
                .is_ok()
        );
        assert_eq!(endpoints.ids(), &[NodeId(1), NodeId(2), NodeId(3)]);
        assert!(matches!(
            endpoints.set("TEST", &[NodeId(1)]),
            Err(EdgeError::Core(CoreError::Arity {
                expected: 3,
                actual: 1,
                ..
            }))
        ));
    }

    #[test]
    fn test_relative_pose_score() {
        let poses = [NodeId(0), NodeId(1)];
        let parameter = Some(NodeId(2));
        let known: NodeSet = [NodeId(0), NodeId(2)].into_iter().collect();

        assert_eq!(relative_pose_score(poses, parameter, &known, NodeId(1)), 1.0);
        assert_eq!(relative_pose_score(poses, parameter, &known, NodeId(0)), -1.0);
        assert_eq!(relative_pose_score(poses, parameter, &known, NodeId(2)), -1.0);

        let without_parameter: NodeSet = [NodeId(0)].into_iter().collect();
        assert_eq!(
            relative_pose_score(poses, parameter, &without_parameter, NodeId(1)),
            -1.0
        );
        assert_eq!(
            relative_pose_score(poses, None, &without_parameter, NodeId(1)),
            1.0
        );

        let both: NodeSet = [NodeId(0), NodeId(1), NodeId(2)].into_iter().collect();
        assert_eq!(relative_pose_score(poses, parameter, &both, NodeId(1)), -1.0);
    }
}
