//! Outlier-model capability boundary.
//!
//! The classifier only needs `fit`, a per-row inlier/outlier verdict and,
//! optionally, a continuous decision score. Any model with that shape can
//! be injected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("cannot fit on an empty batch")]
    EmptyBatch,
    #[error("feature row {row} has {found} columns, expected {expected}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("model has not been fitted")]
    NotFitted,
    #[error("invalid model parameter: {0}")]
    InvalidParameter(String),
}

/// Binary verdict for one feature row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Inlier,
    Outlier,
}

impl Verdict {
    pub fn is_inlier(&self) -> bool {
        matches!(self, Verdict::Inlier)
    }
}

/// Unsupervised outlier detector, retrained from scratch on every batch.
pub trait OutlierModel {
    /// Train on `rows`, discarding any previous state.
    fn fit(&mut self, rows: &[Vec<f64>]) -> Result<(), ModelError>;

    /// Verdict for every row, in order.
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<Verdict>, ModelError>;

    /// Continuous score per row (negative means outlier), if the model has one.
    fn decision_scores(&self, _rows: &[Vec<f64>]) -> Result<Option<Vec<f64>>, ModelError> {
        Ok(None)
    }
}

/// Check that every row has the width of the first one.
pub(crate) fn check_dimensions(rows: &[Vec<f64>], expected: usize) -> Result<(), ModelError> {
    for (row, values) in rows.iter().enumerate() {
        if values.len() != expected {
            return Err(ModelError::DimensionMismatch {
                row,
                expected,
                found: values.len(),
            });
        }
    }
    Ok(())
}
