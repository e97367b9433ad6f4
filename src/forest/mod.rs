//! This module contains the random forest regressor and the trees it is made
//! of.

pub mod ensemble;
pub mod tree;

pub use ensemble::RandomForest;
pub use tree::RegressionTree;

use crate::error::{Error, Result};

/// A dense, row-major matrix of encoded feature values.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl FeatureMatrix {
    /// Build a matrix from rows that must all have the same width.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::SchemaMismatch(format!(
                    "row {} has {} features, expected {}",
                    i,
                    row.len(),
                    cols
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the value at ('row', 'col').
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Returns the features of 'row'.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }
}

#[test]
fn test_feature_matrix() {
    let m = FeatureMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
    assert_eq!(m.rows(), 2);
    assert_eq!(m.cols(), 2);
    assert_eq!(m.get(1, 0), 3.0);
    assert_eq!(m.row(0), &[1.0, 2.0]);

    let ragged = FeatureMatrix::from_rows(&[vec![1.0], vec![3.0, 4.0]]);
    assert!(matches!(ragged, Err(Error::SchemaMismatch(_))));
}
