//! Vertex capability interface and the node types stored in the graph.
//!
//! Every node, whatever it represents, exposes its estimate as a flat vector
//! so that a host optimizer can apply updates without knowing the concrete
//! type. The record layout of each node is owned by its [`Vertex`] impl.

use crate::{
    core::{CoreError, CoreResult, NodeKind},
    io::record::{IoResult, RecordReader, RecordWriter, end_of_record},
    manifold::{LieGroup, se2::SE2},
    parameters::{HasEstimate, ParameterNode, VarianceNode},
};
use nalgebra::{DVector, Vector3};

/// Capability interface shared by all node types.
pub trait Vertex {
    /// Record tag this node is written with.
    fn tag(&self) -> &'static str;

    /// Number of scalars in the estimate.
    fn dimension(&self) -> usize;

    fn estimate_vector(&self) -> DVector<f64>;

    fn set_estimate_vector(&mut self, estimate: &DVector<f64>) -> CoreResult<()>;

    /// Reset the estimate to the neutral value of the node type.
    fn set_to_origin(&mut self);

    /// Apply an increment of length [`Vertex::dimension`] to the estimate.
    fn oplus(&mut self, update: &DVector<f64>) -> CoreResult<()>;

    fn read_fields(&mut self, reader: &mut RecordReader<'_>) -> IoResult<()>;

    /// Read the record, keeping the current value of fields past the end of input.
    fn read(&mut self, reader: &mut RecordReader<'_>) -> IoResult<()> {
        end_of_record(self.read_fields(reader))
    }

    fn write(&self, writer: &mut RecordWriter);
}

pub(crate) fn check_dimension(expected: usize, vector: &DVector<f64>) -> CoreResult<()> {
    if vector.len() != expected {
        return Err(CoreError::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}

/// Robot pose node (`NODE_SE2`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseNode {
    estimate: SE2,
}

impl PoseNode {
    pub const TAG: &'static str = "NODE_SE2";

    pub fn new(estimate: SE2) -> Self {
        Self { estimate }
    }

    pub fn pose(&self) -> &SE2 {
        &self.estimate
    }
}

impl HasEstimate for PoseNode {
    type Estimate = SE2;

    fn estimate(&self) -> SE2 {
        self.estimate
    }

    fn set_estimate(&mut self, estimate: SE2) -> CoreResult<()> {
        self.estimate = estimate;
        Ok(())
    }
}

impl Vertex for PoseNode {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn dimension(&self) -> usize {
        SE2::DOF
    }

    fn estimate_vector(&self) -> DVector<f64> {
        DVector::from(self.estimate)
    }

    fn set_estimate_vector(&mut self, estimate: &DVector<f64>) -> CoreResult<()> {
        self.estimate = SE2::try_from(estimate)?;
        Ok(())
    }

    fn set_to_origin(&mut self) {
        self.estimate = SE2::identity();
    }

    /// Additive update of `[x, y, θ]`.
    fn oplus(&mut self, update: &DVector<f64>) -> CoreResult<()> {
        check_dimension(SE2::DOF, update)?;
        let v = self.estimate.to_vector() + Vector3::new(update[0], update[1], update[2]);
        self.estimate = SE2::from_vector(&v);
        Ok(())
    }

    fn read_fields(&mut self, reader: &mut RecordReader<'_>) -> IoResult<()> {
        self.estimate = reader.read_se2("pose")?;
        Ok(())
    }

    fn write(&self, writer: &mut RecordWriter) {
        writer.write_se2(&self.estimate);
    }
}

/// A node stored in the arena.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Pose(PoseNode),
    Parameter(ParameterNode),
    Variance(VarianceNode),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Pose(_) => NodeKind::Pose,
            Node::Parameter(_) => NodeKind::Parameter,
            Node::Variance(_) => NodeKind::Variance,
        }
    }

    pub fn as_vertex(&self) -> &dyn Vertex {
        match self {
            Node::Pose(node) => node,
            Node::Parameter(node) => node,
            Node::Variance(node) => node,
        }
    }

    pub fn as_vertex_mut(&mut self) -> &mut dyn Vertex {
        match self {
            Node::Pose(node) => node,
            Node::Parameter(node) => node,
            Node::Variance(node) => node,
        }
    }
}

impl From<PoseNode> for Node {
    fn from(node: PoseNode) -> Self {
        Node::Pose(node)
    }
}

impl From<ParameterNode> for Node {
    fn from(node: ParameterNode) -> Self {
        Node::Parameter(node)
    }
}

impl From<VarianceNode> for Node {
    fn from(node: VarianceNode) -> Self {
        Node::Variance(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::ManifoldError;
    use nalgebra::dvector;

    #[test]
    fn test_pose_node_vector_access() -> Result<(), CoreError> {
        let mut node = PoseNode::default();
        assert_eq!(node.dimension(), 3);
        assert_eq!(node.estimate_vector(), dvector![0.0, 0.0, 0.0]);

        node.set_estimate_vector(&dvector![1.0, 2.0, 0.5])?;
        node.oplus(&dvector![0.5, -1.0, 0.25])?;
        assert!((node.estimate_vector() - dvector![1.5, 1.0, 0.75]).norm() < 1e-12);

        node.set_to_origin();
        assert_eq!(node.estimate(), SE2::identity());
        Ok(())
    }

    #[test]
    fn test_pose_node_rejects_wrong_dimension() {
        let mut node = PoseNode::default();
        assert!(matches!(
            node.oplus(&dvector![1.0, 2.0]),
            Err(CoreError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_pose_node_rejects_non_finite_estimate() {
        let mut node = PoseNode::default();
        assert!(matches!(
            node.set_estimate_vector(&dvector![1.0, f64::INFINITY, 0.0]),
            Err(CoreError::Manifold(ManifoldError::InvalidNumber))
        ));
        assert!(matches!(
            node.set_estimate_vector(&dvector![1.0]),
            Err(CoreError::Manifold(ManifoldError::DimensionMismatch { .. }))
        ));
        assert_eq!(node.estimate(), SE2::identity());
    }

    #[test]
    fn test_pose_node_record() -> Result<(), Box<dyn std::error::Error>> {
        let mut node = PoseNode::default();
        let mut reader = RecordReader::new("1 -2 0.5");
        node.read(&mut reader)?;
        assert!((node.pose().to_vector() - Vector3::new(1.0, -2.0, 0.5)).norm() < 1e-12);

        node.set_estimate(SE2::from_xy_angle(1.0, -2.0, 0.0))?;
        let mut writer = RecordWriter::new();
        node.write(&mut writer);
        assert_eq!(writer.as_str(), "1 -2 0");
        Ok(())
    }

    #[test]
    fn test_node_kind() {
        let node = Node::from(PoseNode::default());
        assert_eq!(node.kind(), NodeKind::Pose);
        assert_eq!(node.as_vertex().tag(), "NODE_SE2");
        assert_eq!(Node::from(VarianceNode::default()).kind(), NodeKind::Variance);
    }
}
