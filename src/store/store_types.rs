use failure::Fail;
use serde;

use std::collections::HashMap;
use std::convert::TryFrom;

#[derive(Debug, Clone, PartialEq, Fail)]
pub enum CoreError {
    #[fail(display = "Shape mismatch in '{}': expected {:?}, found {:?}", name, expected, found)]
    ShapeMismatch {
        name: String,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[fail(display = "Identifier mismatch in '{}': {}", name, reason)]
    IdentifierMismatch { name: String, reason: String },
    #[fail(display = "Unknown property: {}", _0)]
    UnknownProperty(String),
    #[fail(display = "Unknown anchor: {}", _0)]
    UnknownAnchor(String),
    #[fail(display = "Invalid argument: {}", _0)]
    InvalidArgument(String),
}

/// Dense row-major matrix of `f64`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "MatrixParts")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

#[derive(serde::Deserialize)]
struct MatrixParts {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl TryFrom<MatrixParts> for Matrix {
    type Error = CoreError;

    fn try_from(parts: MatrixParts) -> Result<Matrix, CoreError> {
        if parts.rows.checked_mul(parts.cols) != Some(parts.values.len()) {
            return Err(CoreError::ShapeMismatch {
                name: "matrix".to_owned(),
                expected: (parts.rows, parts.cols),
                found: (parts.values.len(), 1),
            });
        }
        Ok(Matrix {
            rows: parts.rows,
            cols: parts.cols,
            values: parts.values,
        })
    }
}

impl Matrix {
    /**
     * Every row must hold `col_count` values. With no rows the result is a `0 x col_count`
     * matrix.
     */
    pub fn from_rows(name: &str, col_count: usize, rows: Vec<Vec<f64>>) -> Result<Matrix, CoreError> {
        let row_count = rows.len();

        let mut values = Vec::with_capacity(row_count * col_count);
        for row in rows {
            if row.len() != col_count {
                return Err(CoreError::ShapeMismatch {
                    name: name.to_owned(),
                    expected: (row_count, col_count),
                    found: (row_count, row.len()),
                });
            }
            values.extend(row);
        }

        Ok(Matrix {
            rows: row_count,
            cols: col_count,
            values,
        })
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn row(&self, idx: usize) -> &[f64] {
        &self.values[idx * self.cols..(idx + 1) * self.cols]
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    pub fn transpose(&self) -> Matrix {
        let mut values = Vec::with_capacity(self.values.len());
        for col in 0..self.cols {
            for row in 0..self.rows {
                values.push(self.get(row, col));
            }
        }
        Matrix {
            rows: self.cols,
            cols: self.rows,
            values,
        }
    }

    /// First cell (row, col) that fails `accept`.
    pub fn find_cell<F: Fn(f64) -> bool>(&self, accept: F) -> Option<(usize, usize, f64)> {
        self.values
            .iter()
            .position(|v| !accept(*v))
            .map(|idx| (idx / self.cols, idx % self.cols, self.values[idx]))
    }
}

/// A matrix as it comes out of an artifact: values plus the label of every row and column.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledTable {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub values: Matrix,
}

/**
 * Maps each label to its position. Fails with the first repeated label.
 */
pub fn index_labels(axis: &str, labels: &[String]) -> Result<HashMap<String, usize>, CoreError> {
    let mut positions = HashMap::with_capacity(labels.len());
    for (idx, label) in labels.iter().enumerate() {
        if positions.insert(label.clone(), idx).is_some() {
            return Err(CoreError::IdentifierMismatch {
                name: axis.to_owned(),
                reason: format!("duplicated label '{}'", label),
            });
        }
    }
    Ok(positions)
}

/// Read-only view of one anchor's distances, in property order.
#[derive(Debug, Clone, Copy)]
pub struct DistanceColumn<'a> {
    properties: &'a [String],
    distances: &'a [f64],
}

impl<'a> DistanceColumn<'a> {
    pub fn new(properties: &'a [String], distances: &'a [f64]) -> DistanceColumn<'a> {
        debug_assert_eq!(properties.len(), distances.len());
        DistanceColumn {
            properties,
            distances,
        }
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, property: &str) -> Option<f64> {
        self.properties
            .iter()
            .position(|p| p == property)
            .map(|idx| self.distances[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.properties
            .iter()
            .map(String::as_str)
            .zip(self.distances.iter().cloned())
    }
}

/// Lookup by identifier and row access over loaded similarity matrices.
pub trait SimilarityLookup {
    fn identifiers(&self) -> &[String];

    fn index_of(&self, identifier: &str) -> Result<usize, CoreError>;

    fn has_matrix(&self, name: &str) -> bool;

    /// Row `position` of the matrix called `name`, if such a matrix exists.
    fn similarity_row(&self, name: &str, position: usize) -> Option<&[f64]>;
}

/// Lookup by anchor and column access over a loaded distance table.
pub trait DistanceLookup {
    fn column(&self, anchor: &str) -> Result<DistanceColumn, CoreError>;
}
