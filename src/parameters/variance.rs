//! Per-axis variance node (`INFO3`).
//!
//! The estimate holds per-axis *standard deviations*; the covariance
//! diagonal is derived on demand. Variance-weighted edges read the same
//! estimate directly as an information diagonal.

use crate::{
    core::{
        CoreResult,
        node::{Vertex, check_dimension},
    },
    io::record::{IoResult, RecordReader, RecordWriter},
    parameters::HasEstimate,
};
use nalgebra::{DVector, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VarianceNode {
    std_dev: Vector3<f64>,
}

impl VarianceNode {
    pub const TAG: &'static str = "INFO3";

    pub fn new(std_dev: Vector3<f64>) -> Self {
        Self { std_dev }
    }

    pub fn std_dev(&self) -> &Vector3<f64> {
        &self.std_dev
    }

    /// Elementwise square of the standard deviations.
    pub fn cov_diagonal(&self) -> Vector3<f64> {
        self.std_dev.component_mul(&self.std_dev)
    }
}

impl HasEstimate for VarianceNode {
    type Estimate = Vector3<f64>;

    fn estimate(&self) -> Vector3<f64> {
        self.std_dev
    }

    fn set_estimate(&mut self, estimate: Vector3<f64>) -> CoreResult<()> {
        self.std_dev = estimate;
        Ok(())
    }
}

impl Vertex for VarianceNode {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn dimension(&self) -> usize {
        3
    }

    fn estimate_vector(&self) -> DVector<f64> {
        DVector::from_column_slice(self.std_dev.as_slice())
    }

    fn set_estimate_vector(&mut self, estimate: &DVector<f64>) -> CoreResult<()> {
        check_dimension(3, estimate)?;
        self.std_dev = Vector3::new(estimate[0], estimate[1], estimate[2]);
        Ok(())
    }

    fn set_to_origin(&mut self) {
        self.std_dev = Vector3::zeros();
    }

    fn oplus(&mut self, update: &DVector<f64>) -> CoreResult<()> {
        check_dimension(3, update)?;
        self.std_dev += Vector3::new(update[0], update[1], update[2]);
        Ok(())
    }

    fn read_fields(&mut self, reader: &mut RecordReader<'_>) -> IoResult<()> {
        self.std_dev = reader.read_vector3("std_dev")?;
        Ok(())
    }

    fn write(&self, writer: &mut RecordWriter) {
        writer.write_vector3(&self.std_dev);
    }
}
