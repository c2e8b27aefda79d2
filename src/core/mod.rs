//! Core graph components for the calibration residuals
//!
//! This module contains the pieces every residual needs from its host graph:
//! - Node handles and the node arena with checked, typed access
//! - The vertex capability interface shared by poses, parameters and variances
//! - A minimal graph that evaluates edges and bootstraps unknown nodes
//! - The explicit tag → constructor registry used by the record loader

pub mod graph;
pub mod node;
pub mod registry;

use crate::manifold::ManifoldError;
use std::{
    collections::BTreeSet,
    fmt,
    fmt::{Display, Formatter},
};
use thiserror::Error;
use tracing::error;

/// Handle of a node inside a [`graph::NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(id: usize) -> Self {
        NodeId(id)
    }
}

/// Set of node handles, ordered so that iteration is deterministic.
pub type NodeSet = BTreeSet<NodeId>;

/// The three kinds of node an edge can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Pose,
    Parameter,
    Variance,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Pose => write!(f, "pose"),
            NodeKind::Parameter => write!(f, "parameter"),
            NodeKind::Variance => write!(f, "variance"),
        }
    }
}

/// Core module error types for nodes, edges and the graph
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// A handle points at no node
    #[error("Node {0} does not exist")]
    MissingNode(NodeId),

    /// A handle points at a node of the wrong kind
    #[error("Node {id} is a {actual} node, expected a {expected} node")]
    NodeKind {
        id: NodeId,
        expected: NodeKind,
        actual: NodeKind,
    },

    /// A node id was inserted twice
    #[error("Node {0} already exists")]
    DuplicateNode(NodeId),

    /// An edge was given the wrong number of endpoints
    #[error("Edge {tag} connects {expected} nodes, got {actual}")]
    Arity {
        tag: String,
        expected: usize,
        actual: usize,
    },

    /// Dimension mismatch between an estimate and its update
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Invalid input parameter or configuration
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An estimate vector is not a valid group element
    #[error(transparent)]
    Manifold(#[from] ManifoldError),
}

impl CoreError {
    /// Log the error with tracing::error and return self for chaining
    ///
    /// # Example
    /// ```ignore
    /// graph.pose(id).map_err(|e| e.log())?;
    /// ```
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

/// Result type for core module operations
pub type CoreResult<T> = Result<T, CoreError>;
