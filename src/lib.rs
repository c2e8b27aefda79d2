//! # sclam2d
//!
//! Calibration residuals for 2D pose-graph SLAM.
//!
//! Odometry and sensor measurements are rarely taken in the frame, or at the
//! scale, that the pose graph assumes. This crate models the correction as a
//! calibration parameter attached to relative-pose edges and provides:
//!
//! - **Interpretations**: bias (`T ∘ b`), offset (`o ∘ T ∘ o⁻¹`) and per-axis
//!   scale, applied to `SE2` relative motions
//! - **Parameter nodes**: rigid, one-, two- and three-axis parameters, with the
//!   interpretation fixed by the type, read from the node record, or assigned
//!   by an edge
//! - **Edges**: calibrated relative-pose residuals, variance-weighted residuals
//!   and an adaptive information edge that keeps per-axis variance estimates
//!   consistent with a stored minimum
//! - **Bootstrapping**: single-step initial-estimate rules per edge and a
//!   breadth-first driver over the graph
//! - **Records**: whitespace-delimited text records for every node and edge
//!   type, in two schemas
//!
//! ## Example
//!
//! ```
//! use sclam2d::core::graph::{Graph, GraphConfig};
//! use sclam2d::core::node::PoseNode;
//! use sclam2d::core::NodeId;
//! use sclam2d::edges::CalibrationEdge;
//! use sclam2d::manifold::se2::SE2;
//! use sclam2d::parameters::{HasEstimate, ParameterNode, ParameterValue};
//! # use sclam2d::error::SclamResult;
//! # fn example() -> SclamResult<()> {
//!
//! let mut graph = Graph::new(GraphConfig::default());
//! graph.add_node(NodeId(0), PoseNode::default().into())?;
//! graph.add_node(NodeId(1), PoseNode::default().into())?;
//! let bias = ParameterNode::bias()
//!     .with_value(ParameterValue::Se2(SE2::from_xy_angle(1.0, 0.0, 0.0)))?;
//! graph.add_node(NodeId(2), bias.into())?;
//!
//! let edge = CalibrationEdge::bias()
//!     .between(NodeId(0), NodeId(1), NodeId(2))
//!     .with_measurement(SE2::from_xy_angle(2.0, 0.0, 0.0));
//! graph.add_edge(Box::new(edge))?;
//!
//! graph.set_fixed(NodeId(0))?;
//! graph.set_fixed(NodeId(2))?;
//! graph.bootstrap()?;
//! assert!((graph.pose(NodeId(1))?.estimate().x() - 3.0).abs() < 1e-12);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod core;
pub mod edges;
pub mod error;
pub mod io;
#[cfg(feature = "logging")]
pub mod logger;
pub mod manifold;
pub mod parameters;

pub use core::{
    NodeId, NodeKind, NodeSet,
    graph::{Graph, GraphConfig},
    registry::{Schema, TypeRegistry},
};
pub use edges::{Edge, EdgeError};
pub use error::{SclamError, SclamResult};
#[cfg(feature = "logging")]
pub use logger::{init_logger, init_logger_with_level};
pub use parameters::{Interpretation, ScaleInversion};
