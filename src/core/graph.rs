//! Node arena and the minimal graph that drives edge evaluation.
//!
//! The graph owns every node in a [`NodeArena`] and every edge as a boxed
//! [`Edge`]. Edges refer to nodes by [`NodeId`]; the kind and the number of
//! endpoints are validated once, when the edge is added, so evaluation only
//! ever fails on nodes that changed kind afterwards (which the arena does not
//! allow).
//!
//! # Example
//!
//! ```
//! use sclam2d::core::graph::Graph;
//! use sclam2d::core::node::PoseNode;
//! use sclam2d::core::NodeId;
//! use sclam2d::edges::PoseEdge;
//! use sclam2d::manifold::se2::SE2;
//! # use sclam2d::error::SclamResult;
//! # fn example() -> SclamResult<()> {
//!
//! let mut graph = Graph::default();
//! graph.add_node(NodeId(0), PoseNode::default().into())?;
//! graph.add_node(NodeId(1), PoseNode::default().into())?;
//! let measurement = SE2::from_xy_angle(1.0, 0.0, 0.0);
//! graph.add_edge(Box::new(PoseEdge::new(NodeId(0), NodeId(1), measurement)))?;
//!
//! graph.set_fixed(NodeId(0))?;
//! let initialized = graph.bootstrap()?;
//! assert!(initialized.contains(&NodeId(1)));
//!
//! graph.compute_errors()?;
//! assert!(graph.chi2() < 1e-12);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::{
    core::{
        CoreError, CoreResult, NodeId, NodeKind, NodeSet,
        node::{Node, PoseNode},
        registry::Schema,
    },
    edges::{CAN_INITIALIZE, Edge, EdgeError, EdgeResult},
    parameters::{HasInterpretation, ParameterNode, VarianceNode},
};
use std::collections::{BTreeMap, btree_map};
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Nodes keyed by id, with checked typed access.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeArena {
    nodes: BTreeMap<NodeId, Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: NodeId, node: Node) -> CoreResult<()> {
        match self.nodes.entry(id) {
            btree_map::Entry::Occupied(_) => Err(CoreError::DuplicateNode(id)),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(node);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: NodeId) -> CoreResult<&Node> {
        self.nodes.get(&id).ok_or(CoreError::MissingNode(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> CoreResult<&mut Node> {
        self.nodes.get_mut(&id).ok_or(CoreError::MissingNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn pose(&self, id: NodeId) -> CoreResult<&PoseNode> {
        match self.get(id)? {
            Node::Pose(node) => Ok(node),
            other => Err(kind_error(id, NodeKind::Pose, other)),
        }
    }

    pub fn pose_mut(&mut self, id: NodeId) -> CoreResult<&mut PoseNode> {
        match self.get_mut(id)? {
            Node::Pose(node) => Ok(node),
            other => Err(kind_error(id, NodeKind::Pose, other)),
        }
    }

    pub fn parameter(&self, id: NodeId) -> CoreResult<&ParameterNode> {
        match self.get(id)? {
            Node::Parameter(node) => Ok(node),
            other => Err(kind_error(id, NodeKind::Parameter, other)),
        }
    }

    pub fn parameter_mut(&mut self, id: NodeId) -> CoreResult<&mut ParameterNode> {
        match self.get_mut(id)? {
            Node::Parameter(node) => Ok(node),
            other => Err(kind_error(id, NodeKind::Parameter, other)),
        }
    }

    pub fn variance(&self, id: NodeId) -> CoreResult<&VarianceNode> {
        match self.get(id)? {
            Node::Variance(node) => Ok(node),
            other => Err(kind_error(id, NodeKind::Variance, other)),
        }
    }

    pub fn variance_mut(&mut self, id: NodeId) -> CoreResult<&mut VarianceNode> {
        match self.get_mut(id)? {
            Node::Variance(node) => Ok(node),
            other => Err(kind_error(id, NodeKind::Variance, other)),
        }
    }
}

fn kind_error(id: NodeId, expected: NodeKind, node: &Node) -> CoreError {
    CoreError::NodeKind {
        id,
        expected,
        actual: node.kind(),
    }
}

/// Configuration for loading and evaluating a graph.
///
/// # Example
///
/// ```
/// use sclam2d::core::graph::GraphConfig;
/// use sclam2d::core::registry::Schema;
///
/// let config = GraphConfig::new()
///     .with_schema(Schema::EdgeTagged)
///     .with_bootstrap_rounds(10)
///     .with_fail_on_degenerate(true);
/// assert_eq!(config.schema, Schema::EdgeTagged);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GraphConfig {
    /// Record schema used to construct nodes and edges from tags
    pub schema: Schema,
    /// Upper bound on bootstrap passes; `None` runs until no node can be initialized
    pub bootstrap_rounds: Option<usize>,
    /// Return an error from [`Graph::compute_errors`] when any edge is degenerate
    pub fail_on_degenerate: bool,
    /// Skip records with unknown tags instead of failing the load
    pub skip_unknown: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            schema: Schema::NodeTagged,
            bootstrap_rounds: None,
            fail_on_degenerate: false,
            skip_unknown: false,
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_bootstrap_rounds(mut self, rounds: usize) -> Self {
        self.bootstrap_rounds = Some(rounds);
        self
    }

    pub fn with_fail_on_degenerate(mut self, fail: bool) -> Self {
        self.fail_on_degenerate = fail;
        self
    }

    pub fn with_skip_unknown(mut self, skip: bool) -> Self {
        self.skip_unknown = skip;
        self
    }
}

/// Nodes, edges and the set of nodes held fixed.
#[derive(Debug, Default)]
pub struct Graph {
    config: GraphConfig,
    nodes: NodeArena,
    edges: Vec<Box<dyn Edge>>,
    fixed: NodeSet,
}

impl Graph {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn add_node(&mut self, id: NodeId, node: Node) -> CoreResult<()> {
        self.nodes.insert(id, node)
    }

    /// Add an edge after checking its endpoints against the arena.
    ///
    /// Edges that carry an interpretation for their parameter node assign it
    /// here. A refused assignment (a conflicting interpretation was set
    /// earlier) is reported by the node and does not fail the insert.
    ///
    /// Returns the index of the edge.
    pub fn add_edge(&mut self, edge: Box<dyn Edge>) -> EdgeResult<usize> {
        let kinds = edge.vertex_kinds();
        let vertices = edge.vertices();
        if vertices.len() != kinds.len() {
            return Err(CoreError::Arity {
                tag: edge.tag().to_string(),
                expected: kinds.len(),
                actual: vertices.len(),
            }
            .into());
        }
        for (id, expected) in vertices.iter().zip(kinds) {
            let actual = self.nodes.get(*id)?.kind();
            if actual != *expected {
                return Err(CoreError::NodeKind {
                    id: *id,
                    expected: *expected,
                    actual,
                }
                .into());
            }
        }

        if let Some((id, accepted)) = edge.parameter_requirement() {
            if let Some(interpretation) = self.nodes.parameter(id)?.interpretation() {
                if !accepted.contains(&interpretation) {
                    return Err(EdgeError::RejectedInterpretation {
                        tag: edge.tag(),
                        node: id,
                        interpretation,
                    }
                    .log());
                }
            }
        }

        if let Some((id, interpretation)) = edge.parameter_binding() {
            self.nodes
                .parameter_mut(id)?
                .assign_interpretation(interpretation);
        }

        self.edges.push(edge);
        Ok(self.edges.len() - 1)
    }

    pub fn nodes(&self) -> &NodeArena {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut NodeArena {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[Box<dyn Edge>] {
        &self.edges
    }

    pub fn edge(&self, index: usize) -> Option<&dyn Edge> {
        self.edges.get(index).map(|edge| edge.as_ref())
    }

    pub fn pose(&self, id: NodeId) -> CoreResult<&PoseNode> {
        self.nodes.pose(id)
    }

    pub fn parameter(&self, id: NodeId) -> CoreResult<&ParameterNode> {
        self.nodes.parameter(id)
    }

    pub fn variance(&self, id: NodeId) -> CoreResult<&VarianceNode> {
        self.nodes.variance(id)
    }

    /// Mark a node as known for bootstrapping.
    pub fn set_fixed(&mut self, id: NodeId) -> CoreResult<()> {
        if !self.nodes.contains(id) {
            return Err(CoreError::MissingNode(id));
        }
        self.fixed.insert(id);
        Ok(())
    }

    pub fn fixed(&self) -> &NodeSet {
        &self.fixed
    }

    /// Recompute the error of every edge from the current node estimates.
    pub fn compute_errors(&mut self) -> EdgeResult<()> {
        let nodes = &self.nodes;

        #[cfg(feature = "parallel")]
        self.edges
            .par_iter_mut()
            .try_for_each(|edge| edge.compute_error(nodes))?;

        #[cfg(not(feature = "parallel"))]
        self.edges
            .iter_mut()
            .try_for_each(|edge| edge.compute_error(nodes))?;

        let degenerate = self.degenerate_edges();
        if !degenerate.is_empty() {
            warn!(
                "{} of {} edges have non-finite errors (first: edge {})",
                degenerate.len(),
                self.edges.len(),
                degenerate[0]
            );
            if self.config.fail_on_degenerate {
                return Err(EdgeError::DegenerateResidual {
                    count: degenerate.len(),
                }
                .log());
            }
        }
        Ok(())
    }

    /// `Σ eᵀ Ω e` over all edges, using the errors of the last evaluation.
    pub fn chi2(&self) -> f64 {
        self.edges
            .iter()
            .map(|edge| {
                let error = edge.error();
                (error.transpose() * edge.information() * error)[(0, 0)]
            })
            .sum()
    }

    /// Indices of edges whose last error holds NaN or Inf.
    pub fn degenerate_edges(&self) -> Vec<usize> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, edge)| edge.is_degenerate())
            .map(|(index, _)| index)
            .collect()
    }

    /// Initialize unknown nodes outward from the fixed set.
    ///
    /// Each pass collects, for every node not yet known, the edge with the
    /// highest [`Edge::initial_estimate_possible`] score (ties go to the
    /// lowest edge index), then applies all of them against the known set of
    /// that pass. Passes repeat until nothing changes or the configured
    /// round limit is hit.
    ///
    /// Returns the nodes that were initialized.
    pub fn bootstrap(&mut self) -> EdgeResult<NodeSet> {
        let mut known = self.fixed.clone();
        let mut initialized = NodeSet::new();
        let mut round = 0;

        loop {
            if self
                .config
                .bootstrap_rounds
                .is_some_and(|limit| round >= limit)
            {
                debug!("bootstrap stopped at round limit {}", round);
                break;
            }

            let plan = self.bootstrap_candidates(&known);
            if plan.is_empty() {
                break;
            }

            for (target, index) in &plan {
                let edge = &self.edges[*index];
                debug!(
                    "bootstrap round {}: node {} from edge {} ({})",
                    round,
                    target,
                    index,
                    edge.tag()
                );
                edge.initial_estimate(&known, *target, &mut self.nodes)?;
            }

            for (target, _) in plan {
                known.insert(target);
                initialized.insert(target);
            }
            round += 1;
        }

        let unreached = self.nodes.len() - known.len();
        if unreached > 0 {
            debug!("bootstrap left {} node(s) uninitialized", unreached);
        }
        Ok(initialized)
    }

    fn bootstrap_candidates(&self, known: &NodeSet) -> Vec<(NodeId, usize)> {
        let mut best: BTreeMap<NodeId, (f64, usize)> = BTreeMap::new();
        for (index, edge) in self.edges.iter().enumerate() {
            for target in edge.vertices() {
                if known.contains(target) {
                    continue;
                }
                let score = edge.initial_estimate_possible(known, *target, &self.nodes);
                if score < CAN_INITIALIZE {
                    continue;
                }
                match best.get(target) {
                    Some((current, _)) if *current >= score => {}
                    _ => {
                        best.insert(*target, (score, index));
                    }
                }
            }
        }
        best.into_iter()
            .map(|(target, (_, index))| (target, index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        edges::{CalibrationEdge, InterpretedEdge, PoseEdge, TaggedEdge, VarianceWeightedEdge},
        manifold::{LieGroup, se2::SE2},
        parameters::{HasEstimate, HasInterpretation, Interpretation, ParameterValue},
    };
    use nalgebra::{Matrix3, Vector3};
    use std::error::Error;

    fn chain(length: usize) -> Result<Graph, Box<dyn Error>> {
        let mut graph = Graph::default();
        for i in 0..length {
            graph.add_node(NodeId(i), PoseNode::default().into())?;
        }
        for i in 1..length {
            let measurement = SE2::from_xy_angle(1.0, 0.0, 0.0);
            graph.add_edge(Box::new(PoseEdge::new(NodeId(i - 1), NodeId(i), measurement)))?;
        }
        Ok(graph)
    }

    #[test]
    fn test_arena_typed_access() -> Result<(), Box<dyn Error>> {
        let mut nodes = NodeArena::new();
        nodes.insert(NodeId(0), PoseNode::default().into())?;
        nodes.insert(NodeId(1), VarianceNode::default().into())?;

        assert!(nodes.pose(NodeId(0)).is_ok());
        assert!(matches!(
            nodes.parameter(NodeId(1)),
            Err(CoreError::NodeKind {
                expected: NodeKind::Parameter,
                actual: NodeKind::Variance,
                ..
            })
        ));
        assert!(matches!(
            nodes.pose(NodeId(7)),
            Err(CoreError::MissingNode(NodeId(7)))
        ));
        assert!(matches!(
            nodes.insert(NodeId(0), PoseNode::default().into()),
            Err(CoreError::DuplicateNode(NodeId(0)))
        ));
        assert_eq!(nodes.ids().collect::<Vec<_>>(), vec![NodeId(0), NodeId(1)]);
        Ok(())
    }

    #[test]
    fn test_add_edge_checks_endpoints() -> Result<(), Box<dyn Error>> {
        let mut graph = chain(2)?;
        graph.add_node(NodeId(5), VarianceNode::default().into())?;

        let wrong_kind = CalibrationEdge::bias().between(NodeId(0), NodeId(1), NodeId(5));
        assert!(matches!(
            graph.add_edge(Box::new(wrong_kind)),
            Err(EdgeError::Core(CoreError::NodeKind { .. }))
        ));

        let missing = PoseEdge::new(NodeId(0), NodeId(9), SE2::identity());
        assert!(matches!(
            graph.add_edge(Box::new(missing)),
            Err(EdgeError::Core(CoreError::MissingNode(NodeId(9))))
        ));

        let edge = VarianceWeightedEdge::info().between(NodeId(0), NodeId(1), NodeId(5));
        assert_eq!(graph.add_edge(Box::new(edge))?, 1);
        Ok(())
    }

    #[test]
    fn test_add_edge_binds_interpretation() -> Result<(), Box<dyn Error>> {
        let mut graph = chain(2)?;
        graph.add_node(NodeId(2), ParameterNode::se2().untagged().into())?;

        let edge = TaggedEdge::pse2()
            .with_interpretation(Interpretation::Offset)
            .between(NodeId(0), NodeId(1), NodeId(2));
        graph.add_edge(Box::new(edge))?;
        assert_eq!(
            graph.parameter(NodeId(2))?.interpretation(),
            Some(Interpretation::Offset)
        );

        // first assignment wins
        let edge = TaggedEdge::pse2()
            .with_interpretation(Interpretation::Bias)
            .between(NodeId(0), NodeId(1), NodeId(2));
        graph.add_edge(Box::new(edge))?;
        assert_eq!(
            graph.parameter(NodeId(2))?.interpretation(),
            Some(Interpretation::Offset)
        );
        Ok(())
    }

    #[test]
    fn test_add_edge_refuses_parameter_the_edge_cannot_apply() -> Result<(), Box<dyn Error>> {
        let mut graph = chain(2)?;
        let bias = ParameterNode::v3().with_interpretation(Interpretation::Bias)?;
        graph.add_node(NodeId(2), bias.into())?;
        let scale = ParameterNode::v3().with_interpretation(Interpretation::Scale)?;
        graph.add_node(NodeId(3), scale.into())?;

        let pv3 = InterpretedEdge::pv3().between(NodeId(0), NodeId(1), NodeId(2));
        assert!(matches!(
            graph.add_edge(Box::new(pv3)),
            Err(EdgeError::RejectedInterpretation {
                node: NodeId(2),
                interpretation: Interpretation::Bias,
                ..
            })
        ));

        // the generic edge applies any interpretation
        let v3 = InterpretedEdge::v3().between(NodeId(0), NodeId(1), NodeId(2));
        graph.add_edge(Box::new(v3))?;
        let pv3 = InterpretedEdge::pv3().between(NodeId(0), NodeId(1), NodeId(3));
        graph.add_edge(Box::new(pv3))?;
        assert_eq!(graph.edges().len(), 3);
        Ok(())
    }

    #[test]
    fn test_bootstrap_is_breadth_first() -> Result<(), Box<dyn Error>> {
        let mut graph = chain(4)?;
        graph.set_fixed(NodeId(0))?;
        let initialized = graph.bootstrap()?;
        assert_eq!(
            initialized,
            [NodeId(1), NodeId(2), NodeId(3)].into_iter().collect()
        );
        let last = graph.pose(NodeId(3))?.estimate();
        assert!(last.is_approx(&SE2::from_xy_angle(3.0, 0.0, 0.0), 1e-12));

        graph.compute_errors()?;
        assert!(graph.chi2() < 1e-20);
        Ok(())
    }

    #[test]
    fn test_bootstrap_round_limit() -> Result<(), Box<dyn Error>> {
        let mut graph = chain(4)?;
        graph.config = GraphConfig::new().with_bootstrap_rounds(1);
        graph.set_fixed(NodeId(0))?;
        assert_eq!(graph.bootstrap()?, [NodeId(1)].into_iter().collect());
        Ok(())
    }

    #[test]
    fn test_bootstrap_ties_go_to_lowest_edge() -> Result<(), Box<dyn Error>> {
        let mut graph = chain(2)?;
        let other = PoseEdge::new(NodeId(0), NodeId(1), SE2::from_xy_angle(5.0, 0.0, 0.0));
        graph.add_edge(Box::new(other))?;
        graph.set_fixed(NodeId(0))?;
        graph.bootstrap()?;
        let pose = graph.pose(NodeId(1))?.estimate();
        assert!(pose.is_approx(&SE2::from_xy_angle(1.0, 0.0, 0.0), 1e-12));
        Ok(())
    }

    #[test]
    fn test_bootstrap_skips_edges_without_interpretation() -> Result<(), Box<dyn Error>> {
        let mut graph = Graph::default();
        graph.add_node(NodeId(0), PoseNode::default().into())?;
        graph.add_node(NodeId(1), PoseNode::default().into())?;
        graph.add_node(NodeId(2), ParameterNode::se2().into())?;
        graph.add_node(NodeId(3), ParameterNode::se2().untagged().into())?;
        graph.add_node(NodeId(4), PoseNode::default().into())?;

        let measurement = SE2::from_xy_angle(2.0, 0.0, 0.0);
        let interpreted = InterpretedEdge::pse2()
            .between(NodeId(0), NodeId(1), NodeId(2))
            .with_measurement(measurement);
        let tagged = TaggedEdge::pse2()
            .between(NodeId(1), NodeId(4), NodeId(3))
            .with_measurement(measurement);
        graph.add_edge(Box::new(interpreted))?;
        graph.add_edge(Box::new(tagged))?;
        graph.add_edge(Box::new(PoseEdge::new(NodeId(0), NodeId(1), measurement)))?;
        graph.add_edge(Box::new(PoseEdge::new(NodeId(1), NodeId(4), measurement)))?;

        for id in [0, 2, 3] {
            graph.set_fixed(NodeId(id))?;
        }
        let initialized = graph.bootstrap()?;
        assert_eq!(initialized, [NodeId(1), NodeId(4)].into_iter().collect());
        let last = graph.pose(NodeId(4))?.estimate();
        assert!(last.is_approx(&SE2::from_xy_angle(4.0, 0.0, 0.0), 1e-12));
        Ok(())
    }

    #[test]
    fn test_bootstrap_through_calibration_edge() -> Result<(), Box<dyn Error>> {
        let mut graph = chain(2)?;
        let bias = ParameterNode::bias()
            .with_value(ParameterValue::Se2(SE2::from_xy_angle(0.5, 0.0, 0.0)))?;
        graph.add_node(NodeId(2), bias.into())?;
        graph.add_node(NodeId(3), PoseNode::default().into())?;
        let edge = CalibrationEdge::bias()
            .between(NodeId(1), NodeId(3), NodeId(2))
            .with_measurement(SE2::from_xy_angle(1.0, 0.0, 0.0));
        graph.add_edge(Box::new(edge))?;

        // without the parameter node known, pose 3 is unreachable
        graph.set_fixed(NodeId(0))?;
        let initialized = graph.bootstrap()?;
        assert!(!initialized.contains(&NodeId(3)));

        graph.set_fixed(NodeId(2))?;
        let initialized = graph.bootstrap()?;
        assert!(initialized.contains(&NodeId(3)));
        let pose = graph.pose(NodeId(3))?.estimate();
        assert!(pose.is_approx(&SE2::from_xy_angle(2.5, 0.0, 0.0), 1e-12));
        Ok(())
    }

    #[test]
    fn test_chi2_uses_information() -> Result<(), Box<dyn Error>> {
        let mut graph = Graph::default();
        graph.add_node(NodeId(0), PoseNode::default().into())?;
        graph.add_node(
            NodeId(1),
            PoseNode::new(SE2::from_xy_angle(3.0, 0.0, 0.0)).into(),
        )?;
        let information = Matrix3::from_diagonal(&Vector3::new(2.0, 1.0, 1.0));
        let edge = PoseEdge::new(NodeId(0), NodeId(1), SE2::from_xy_angle(2.0, 0.0, 0.0))
            .with_information(information);
        graph.add_edge(Box::new(edge))?;
        graph.compute_errors()?;
        assert!((graph.chi2() - 2.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_degenerate_edges() -> Result<(), Box<dyn Error>> {
        let build = |config: GraphConfig| -> Result<Graph, Box<dyn Error>> {
            let mut graph = Graph::new(config);
            graph.add_node(NodeId(0), PoseNode::default().into())?;
            graph.add_node(
                NodeId(1),
                PoseNode::new(SE2::from_xy_angle(1.0, 0.0, 0.0)).into(),
            )?;
            graph.add_node(
                NodeId(2),
                VarianceNode::new(Vector3::new(-1.0, 1.0, 1.0)).into(),
            )?;
            let edge = VarianceWeightedEdge::info().between(NodeId(0), NodeId(1), NodeId(2));
            graph.add_edge(Box::new(edge))?;
            Ok(graph)
        };

        let mut graph = build(GraphConfig::default())?;
        graph.compute_errors()?;
        assert_eq!(graph.degenerate_edges(), vec![0]);

        let mut graph = build(GraphConfig::new().with_fail_on_degenerate(true))?;
        assert!(matches!(
            graph.compute_errors(),
            Err(EdgeError::DegenerateResidual { count: 1 })
        ));
        Ok(())
    }
}
