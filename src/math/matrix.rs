use serde::{Serialize, Deserialize};

use crate::error::{NetError, Result};

/// Row-major dense matrix. Weight tensors use one row per source neuron
/// (plus the bias row) and one column per target neuron.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Builds a matrix by calling `f(row, col)` for every cell, row by row.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Matrix
    where
        F: FnMut(usize, usize) -> f64,
    {
        let data = (0..rows)
            .map(|i| (0..cols).map(|j| f(i, j)).collect())
            .collect();
        Matrix { rows, cols, data }
    }

    /// Wraps nested rows; every row must have the same length.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, |r| r.len());
        if let Some(bad) = data.iter().find(|r| r.len() != cols) {
            return Err(NetError::ParameterShape {
                what: "matrix row",
                expected: cols.to_string(),
                got: bad.len().to_string(),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Checks that `data` really holds `rows` rows of `cols` values each.
    /// The fields are public, so a hand-built or deserialized matrix can
    /// disagree with its declared shape.
    pub fn check_consistent(&self) -> Result<()> {
        if self.data.len() != self.rows {
            return Err(NetError::ParameterShape {
                what: "matrix rows",
                expected: self.rows.to_string(),
                got: self.data.len().to_string(),
            });
        }
        if let Some(bad) = self.data.iter().find(|r| r.len() != self.cols) {
            return Err(NetError::ParameterShape {
                what: "matrix row",
                expected: self.cols.to_string(),
                got: bad.len().to_string(),
            });
        }
        Ok(())
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// `Σ_i v[i] · self[i][col]` over the first `v.len()` rows.
    pub fn column_dot(&self, col: usize, v: &[f64]) -> f64 {
        v.iter()
            .zip(self.data.iter())
            .map(|(x, row)| x * row[col])
            .sum()
    }

    /// `Σ_k self[row][k] · v[k]`.
    pub fn row_dot(&self, row: usize, v: &[f64]) -> f64 {
        self.data[row].iter().zip(v.iter()).map(|(w, x)| w * x).sum()
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Row-major copy of every cell.
    pub fn flatten(&self) -> Vec<f64> {
        self.data.iter().flatten().copied().collect()
    }

    /// Overwrites every cell from a row-major slice of length `rows * cols`.
    pub fn assign_flat(&mut self, values: &[f64]) {
        for (cell, v) in self.data.iter_mut().flatten().zip(values) {
            *cell = *v;
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}
