//! Explicit tag → constructor registry for nodes and edges.
//!
//! Two record schemas share tag names with different meanings, so a
//! registry is always built for one [`Schema`]. Registration order is kept
//! and is the order reported by [`TypeRegistry::node_tags`] and
//! [`TypeRegistry::edge_tags`].

use crate::{
    core::{
        CoreError,
        node::{Node, PoseNode},
    },
    edges::{
        AdaptiveInfoEdge, CalibrationEdge, Edge, InterpretedEdge, PoseEdge, TaggedEdge,
        VarianceWeightedEdge,
    },
    parameters::{ParameterNode, VarianceNode},
};
use std::{
    fmt,
    fmt::{Display, Formatter},
    str::FromStr,
};

/// Which revision of the record format to construct types for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schema {
    /// Parameter nodes carry their interpretation in their own record.
    #[default]
    NodeTagged,
    /// Edges carry the interpretation and assign it to the parameter node.
    EdgeTagged,
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Schema::NodeTagged => write!(f, "node-tagged"),
            Schema::EdgeTagged => write!(f, "edge-tagged"),
        }
    }
}

impl FromStr for Schema {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "node-tagged" | "node" => Ok(Schema::NodeTagged),
            "edge-tagged" | "edge" => Ok(Schema::EdgeTagged),
            _ => Err(CoreError::InvalidInput(format!(
                "unknown schema '{s}', expected 'node-tagged' or 'edge-tagged'"
            ))),
        }
    }
}

pub type NodeFactory = Box<dyn Fn() -> Node + Send + Sync>;
pub type EdgeFactory = Box<dyn Fn() -> Box<dyn Edge> + Send + Sync>;

pub struct TypeRegistry {
    schema: Schema,
    nodes: Vec<(&'static str, NodeFactory)>,
    edges: Vec<(&'static str, EdgeFactory)>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("schema", &self.schema)
            .field("nodes", &self.node_tags())
            .field("edges", &self.edge_tags())
            .finish()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new(Schema::default())
    }
}

impl TypeRegistry {
    /// Registry with no types registered.
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Registry holding every built-in type of `schema`.
    pub fn new(schema: Schema) -> Self {
        let mut registry = Self::empty(schema);
        match schema {
            Schema::NodeTagged => registry.register_node_tagged(),
            Schema::EdgeTagged => registry.register_edge_tagged(),
        }
        registry
    }

    fn register_node_tagged(&mut self) {
        self.register_node(PoseNode::TAG, || PoseNode::default().into());
        self.register_node("PARAM_BIAS", || ParameterNode::bias().into());
        self.register_node("PARAM_OFFSET", || ParameterNode::offset().into());
        self.register_node("PARAM_SCALE", || ParameterNode::scale().into());
        self.register_node("PARAM_SE2", || ParameterNode::se2().into());
        self.register_node("PARAM_V1", || ParameterNode::v1().into());
        self.register_node("PARAM_V2", || ParameterNode::v2().into());
        self.register_node("PARAM_V3", || ParameterNode::v3().into());
        self.register_node(VarianceNode::TAG, || VarianceNode::default().into());

        self.register_edge(PoseEdge::TAG, || Box::new(PoseEdge::default()));
        self.register_edge(CalibrationEdge::BIAS_TAG, || {
            Box::new(CalibrationEdge::bias())
        });
        self.register_edge(CalibrationEdge::OFFSET_TAG, || {
            Box::new(CalibrationEdge::offset())
        });
        self.register_edge(CalibrationEdge::SCALE_TAG, || {
            Box::new(CalibrationEdge::scale())
        });
        self.register_edge(InterpretedEdge::PSE2_TAG, || {
            Box::new(InterpretedEdge::pse2())
        });
        self.register_edge(InterpretedEdge::PV3_TAG, || Box::new(InterpretedEdge::pv3()));
        self.register_edge(InterpretedEdge::SE2_TAG, || Box::new(InterpretedEdge::se2()));
        self.register_edge(InterpretedEdge::V1_TAG, || Box::new(InterpretedEdge::v1()));
        self.register_edge(InterpretedEdge::V2_TAG, || Box::new(InterpretedEdge::v2()));
        self.register_edge(InterpretedEdge::V3_TAG, || Box::new(InterpretedEdge::v3()));
        self.register_edge(VarianceWeightedEdge::INFO_TAG, || {
            Box::new(VarianceWeightedEdge::info())
        });
        self.register_edge(AdaptiveInfoEdge::TAG, || {
            Box::new(AdaptiveInfoEdge::default())
        });
    }

    fn register_edge_tagged(&mut self) {
        self.register_node(PoseNode::TAG, || PoseNode::default().into());
        self.register_node("PARAM_SE2", || ParameterNode::se2().untagged().into());
        self.register_node("PARAM_V2", || {
            ParameterNode::v2().untagged().scale_only().into()
        });
        self.register_node(VarianceNode::TAG, || VarianceNode::default().into());

        self.register_edge(PoseEdge::TAG, || Box::new(PoseEdge::default()));
        self.register_edge(TaggedEdge::PSE2_TAG, || Box::new(TaggedEdge::pse2()));
        self.register_edge(TaggedEdge::PV2_TAG, || Box::new(TaggedEdge::pv2()));
        self.register_edge(VarianceWeightedEdge::COV_TAG, || {
            Box::new(VarianceWeightedEdge::cov())
        });
        self.register_edge(AdaptiveInfoEdge::TAG, || {
            Box::new(AdaptiveInfoEdge::default())
        });
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Register a node constructor. A later registration of the same tag
    /// replaces the earlier one and keeps its position.
    pub fn register_node<F>(&mut self, tag: &'static str, factory: F)
    where
        F: Fn() -> Node + Send + Sync + 'static,
    {
        match self.nodes.iter_mut().find(|(t, _)| *t == tag) {
            Some(entry) => entry.1 = Box::new(factory),
            None => self.nodes.push((tag, Box::new(factory))),
        }
    }

    /// Register an edge constructor, with the same replacement rule as
    /// [`TypeRegistry::register_node`].
    pub fn register_edge<F>(&mut self, tag: &'static str, factory: F)
    where
        F: Fn() -> Box<dyn Edge> + Send + Sync + 'static,
    {
        match self.edges.iter_mut().find(|(t, _)| *t == tag) {
            Some(entry) => entry.1 = Box::new(factory),
            None => self.edges.push((tag, Box::new(factory))),
        }
    }

    pub fn create_node(&self, tag: &str) -> Option<Node> {
        self.nodes
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, factory)| factory())
    }

    pub fn create_edge(&self, tag: &str) -> Option<Box<dyn Edge>> {
        self.edges
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, factory)| factory())
    }

    pub fn node_tags(&self) -> Vec<&'static str> {
        self.nodes.iter().map(|(tag, _)| *tag).collect()
    }

    pub fn edge_tags(&self) -> Vec<&'static str> {
        self.edges.iter().map(|(tag, _)| *tag).collect()
    }
}
