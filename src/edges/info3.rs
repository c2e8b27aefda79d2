//! Adaptive information edge (`CONSTRAINT_INFO3`).
//!
//! The edge does not constrain a pose. It compares the covariance diagonal
//! of one variance node with a minimum covariance stored in the edge:
//!
//! ```text
//! r_i     = cov_node[i] / cov_min[i]
//! S       = Σ r_i
//! D       = Π r_i
//! f(D)    = ln D + 1 / (100 · D^100) − 0.01
//! error_i = sqrt(multiplier · f(D) · r_i / S)
//! ```
//!
//! `f` has its minimum `f(1) = 0` and grows on both sides, so the error
//! penalizes variance nodes that drift away from the stored minimum in
//! either direction. Ratios of zero or below produce NaN entries; these are
//! reported and kept, see [`Edge::is_degenerate`].

use crate::{
    core::{NodeId, NodeKind, graph::NodeArena},
    edges::{Edge, EdgeResult, Endpoints},
    io::record::{IoResult, RecordReader, RecordWriter},
};
use nalgebra::Vector3;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveInfoEdge {
    endpoints: Endpoints<1>,
    /// Minimum standard deviation per axis.
    measurement: Vector3<f64>,
    multiplier: i64,
    error: Vector3<f64>,
}

impl Default for AdaptiveInfoEdge {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            measurement: Vector3::repeat(1.0),
            // a record always overrides this; 1 keeps a hand-built edge active
            multiplier: 1,
            error: Vector3::zeros(),
        }
    }
}

impl AdaptiveInfoEdge {
    pub const TAG: &'static str = "CONSTRAINT_INFO3";

    pub fn new(variance: NodeId, min_std_dev: Vector3<f64>) -> Self {
        Self {
            endpoints: Endpoints::new([variance]),
            measurement: min_std_dev,
            ..Self::default()
        }
    }

    pub fn with_multiplier(mut self, multiplier: i64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Confidence function `f(D)`.
    pub fn confidence(d: f64) -> f64 {
        d.ln() + 1.0 / (100.0 * d.powi(100)) - 0.01
    }

    pub fn min_std_dev(&self) -> &Vector3<f64> {
        &self.measurement
    }

    pub fn multiplier(&self) -> i64 {
        self.multiplier
    }

    pub fn increment_multiplier(&mut self) {
        self.multiplier += 1;
    }

    pub fn cov_diagonal(&self) -> Vector3<f64> {
        self.measurement.component_mul(&self.measurement)
    }

    pub fn info_diagonal(&self) -> Vector3<f64> {
        self.cov_diagonal().map(|c| 1.0 / c)
    }

    /// Store the minimum deviation given as an information diagonal.
    pub fn set_info_diagonal(&mut self, info: &Vector3<f64>) {
        self.measurement = info.map(|i| (1.0 / i).sqrt());
    }
}

impl Edge for AdaptiveInfoEdge {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn vertices(&self) -> &[NodeId] {
        self.endpoints.as_slice()
    }

    fn vertex_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Variance]
    }

    fn set_vertices(&mut self, vertices: &[NodeId]) -> EdgeResult<()> {
        self.endpoints.set(Self::TAG, vertices)
    }

    fn compute_error(&mut self, nodes: &NodeArena) -> EdgeResult<()> {
        let [variance] = *self.endpoints.ids();
        let cov_node = nodes.variance(variance)?.cov_diagonal();
        let ratios = cov_node.component_div(&self.cov_diagonal());
        let sum = ratios.sum();
        let confidence = Self::confidence(ratios.product());
        let scale = self.multiplier as f64 * confidence / sum;

        self.error = ratios.map(|r| (scale * r).sqrt());
        if self.is_degenerate() {
            warn!(
                "{}: degenerate ratio for variance node {} (ratios {:?}, error {:?})",
                Self::TAG,
                variance,
                ratios.as_slice(),
                self.error.as_slice()
            );
        }
        Ok(())
    }

    fn error(&self) -> &Vector3<f64> {
        &self.error
    }

    fn read_fields(&mut self, reader: &mut RecordReader<'_>) -> IoResult<()> {
        self.multiplier = reader.read_i64("multiplier")?;
        self.measurement = reader.read_vector3("min_std_dev")?;
        Ok(())
    }

    fn write(&self, writer: &mut RecordWriter) {
        writer
            .write_i64(self.multiplier)
            .write_vector3(&self.measurement);
    }
}
