//! Error types for the sclam2d library
//!
//! Every module defines its own error enum with `thiserror`:
//! - **`CoreError`**: node access, arity and configuration problems
//! - **`ManifoldError`**: conversions into and out of `SE2`
//! - **`EdgeError`**: residual evaluation and bootstrapping
//! - **`IoError`**: records and graph files
//!
//! **`SclamError`** wraps them for callers that combine several modules,
//! keeping the source chain intact.
//!
//! Example error chain:
//! ```text
//! SclamError::Edge(
//!     EdgeError::Core(
//!         CoreError::NodeKind { id: 2, expected: parameter, actual: pose }
//!     )
//! )
//! ```

use crate::{core::CoreError, edges::EdgeError, io::IoError, manifold::ManifoldError};
use std::error::Error as StdError;
use thiserror::Error;

/// Result type for operations spanning several modules
pub type SclamResult<T> = Result<T, SclamError>;

/// Top-level error type
///
/// ```rust,ignore
/// if let Err(e) = graph.compute_errors().map_err(SclamError::from) {
///     warn!("Evaluation failed: {}", e.chain_compact());
/// }
/// ```
#[derive(Debug, Error)]
pub enum SclamError {
    /// Node arena, registry and configuration errors
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Manifold conversion errors
    #[error(transparent)]
    Manifold(#[from] ManifoldError),

    /// Residual evaluation and bootstrapping errors
    #[error(transparent)]
    Edge(#[from] EdgeError),

    /// Record and graph file errors
    #[error(transparent)]
    Io(#[from] IoError),
}

impl SclamError {
    /// Full error chain, one error per line.
    pub fn chain(&self) -> String {
        let mut chain = vec![self.to_string()];
        let mut source = self.source();

        while let Some(err) = source {
            chain.push(format!("  → {}", err));
            source = err.source();
        }

        chain.join("\n")
    }

    /// Single-line error chain for log messages.
    pub fn chain_compact(&self) -> String {
        let mut chain = vec![self.to_string()];
        let mut source = self.source();

        while let Some(err) = source {
            chain.push(err.to_string());
            source = err.source();
        }

        chain.join(" → ")
    }
}
