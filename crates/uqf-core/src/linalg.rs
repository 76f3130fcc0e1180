//! Numeric containers consumed by the function framework.

use std::ops::{Add, Index, IndexMut, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::errors::{check_dimension, UqfError};

/// Dense real matrix used for gradients and linear maps.
pub type Matrix = nalgebra::DMatrix<f64>;

/// Fixed-size real vector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Point(Vec<f64>);

impl Point {
    /// Creates a zero point of the given dimension.
    pub fn zeros(dimension: usize) -> Self {
        Self(vec![0.0; dimension])
    }

    /// Creates a point whose components all equal `value`.
    pub fn filled(dimension: usize, value: f64) -> Self {
        Self(vec![value; dimension])
    }

    /// Returns the number of components.
    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Returns the components as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Returns the components as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.0
    }

    /// Iterates over the components.
    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    /// Consumes the point and returns its storage.
    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }

    /// Returns whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|value| value.is_finite())
    }

    /// Returns the concatenation `(self, other)`.
    pub fn concat(&self, other: &Point) -> Point {
        let mut values = Vec::with_capacity(self.dimension() + other.dimension());
        values.extend_from_slice(&self.0);
        values.extend_from_slice(&other.0);
        Point(values)
    }

    /// Returns the components `[start, end)` as a new point.
    pub fn slice(&self, start: usize, end: usize) -> Result<Point, UqfError> {
        if start > end || end > self.dimension() {
            return Err(UqfError::index_out_of_range("point slice", end, self.dimension() + 1));
        }
        Ok(Point(self.0[start..end].to_vec()))
    }

    /// Returns the components at `indices`, in order.
    pub fn select(&self, indices: &[usize]) -> Result<Point, UqfError> {
        indices
            .iter()
            .map(|&index| {
                self.0
                    .get(index)
                    .copied()
                    .ok_or_else(|| UqfError::index_out_of_range("point component", index, self.dimension()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Point)
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.0.iter().map(|value| value * value).sum::<f64>().sqrt()
    }
}

impl From<Vec<f64>> for Point {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl From<&[f64]> for Point {
    fn from(values: &[f64]) -> Self {
        Self(values.to_vec())
    }
}

impl Index<usize> for Point {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl IndexMut<usize> for Point {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.0[index]
    }
}

impl Add for &Point {
    type Output = Point;

    fn add(self, rhs: &Point) -> Point {
        Point(self.0.iter().zip(&rhs.0).map(|(a, b)| a + b).collect())
    }
}

impl Sub for &Point {
    type Output = Point;

    fn sub(self, rhs: &Point) -> Point {
        Point(self.0.iter().zip(&rhs.0).map(|(a, b)| a - b).collect())
    }
}

impl Mul<f64> for &Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point(self.0.iter().map(|value| value * rhs).collect())
    }
}

/// Ordered batch of points sharing one dimension, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    size: usize,
    dimension: usize,
    data: Vec<f64>,
}

impl Sample {
    /// Creates a sample of `size` zero rows.
    pub fn zeros(size: usize, dimension: usize) -> Self {
        Self {
            size,
            dimension,
            data: vec![0.0; size * dimension],
        }
    }

    /// Creates an empty sample with the given row dimension.
    pub fn empty(dimension: usize) -> Self {
        Self {
            size: 0,
            dimension,
            data: Vec::new(),
        }
    }

    /// Builds a sample from rows, all of which must share `dimension`.
    pub fn from_rows<R: AsRef<[f64]>>(dimension: usize, rows: &[R]) -> Result<Self, UqfError> {
        let mut sample = Self {
            size: 0,
            dimension,
            data: Vec::with_capacity(rows.len() * dimension),
        };
        for row in rows {
            sample.push_slice(row.as_ref())?;
        }
        Ok(sample)
    }

    /// Builds a one-dimensional sample from scalar values.
    pub fn from_column(values: &[f64]) -> Self {
        Self {
            size: values.len(),
            dimension: 1,
            data: values.to_vec(),
        }
    }

    /// Number of rows.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Dimension of each row.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns row `index` as a slice.
    pub fn row(&self, index: usize) -> &[f64] {
        &self.data[index * self.dimension..(index + 1) * self.dimension]
    }

    /// Returns row `index` as a point.
    pub fn point(&self, index: usize) -> Point {
        Point::from(self.row(index))
    }

    /// Iterates over the rows as slices.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        (0..self.size()).map(move |index| self.row(index))
    }

    /// Returns element `(row, column)`.
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.data[row * self.dimension + column]
    }

    /// Sets element `(row, column)`.
    pub fn set(&mut self, row: usize, column: usize, value: f64) {
        self.data[row * self.dimension + column] = value;
    }

    /// Appends a row.
    pub fn push(&mut self, point: &Point) -> Result<(), UqfError> {
        self.push_slice(point.as_slice())
    }

    /// Appends a row given as a slice.
    pub fn push_slice(&mut self, row: &[f64]) -> Result<(), UqfError> {
        check_dimension("sample row", self.dimension, row.len())?;
        self.data.extend_from_slice(row);
        self.size += 1;
        Ok(())
    }

    /// Appends all rows of `other`.
    pub fn append(&mut self, other: &Sample) -> Result<(), UqfError> {
        check_dimension("appended sample", self.dimension, other.dimension)?;
        self.data.extend_from_slice(&other.data);
        self.size += other.size;
        Ok(())
    }

    /// Drops the oldest rows so that at most `size` remain.
    pub fn keep_last(&mut self, size: usize) {
        if self.size > size {
            self.data.drain(..(self.size - size) * self.dimension);
            self.size = size;
        }
    }

    /// Returns the columns at `indices`, in order.
    pub fn marginal(&self, indices: &[usize]) -> Result<Sample, UqfError> {
        if let Some(&bad) = indices.iter().find(|&&index| index >= self.dimension) {
            return Err(UqfError::index_out_of_range("sample marginal", bad, self.dimension));
        }
        let mut data = Vec::with_capacity(self.size() * indices.len());
        for row in self.rows() {
            data.extend(indices.iter().map(|&index| row[index]));
        }
        Ok(Sample {
            size: self.size,
            dimension: indices.len(),
            data,
        })
    }

    /// Concatenates the columns of `self` and `other` row by row.
    pub fn stack(&self, other: &Sample) -> Result<Sample, UqfError> {
        check_dimension("stacked sample size", self.size(), other.size())?;
        let dimension = self.dimension + other.dimension;
        let mut data = Vec::with_capacity(self.size() * dimension);
        for (left, right) in self.rows().zip(other.rows()) {
            data.extend_from_slice(left);
            data.extend_from_slice(right);
        }
        Ok(Sample {
            size: self.size,
            dimension,
            data,
        })
    }

    /// Returns whether every element is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|value| value.is_finite())
    }

    /// Returns the raw row-major storage.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Ordered labels attached to the components of a point or sample.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Description(Vec<String>);

impl Description {
    /// Builds `prefix0 .. prefix{n-1}`.
    pub fn build_default(size: usize, prefix: &str) -> Self {
        Self((0..size).map(|index| format!("{prefix}{index}")).collect())
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no labels are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the label at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Iterates over the labels.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Returns the labels at `indices`, in order.
    pub fn select(&self, indices: &[usize]) -> Result<Description, UqfError> {
        indices
            .iter()
            .map(|&index| {
                self.0
                    .get(index)
                    .cloned()
                    .ok_or_else(|| UqfError::index_out_of_range("description", index, self.len()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Description)
    }

    /// Returns the labels `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<Description, UqfError> {
        if start > end || end > self.len() {
            return Err(UqfError::index_out_of_range("description slice", end, self.len() + 1));
        }
        Ok(Description(self.0[start..end].to_vec()))
    }

    /// Returns the concatenation `(self, other)`.
    pub fn concat(&self, other: &Description) -> Description {
        Description(self.0.iter().chain(other.0.iter()).cloned().collect())
    }
}

impl<S: Into<String>> FromIterator<S> for Description {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Tensor `T[i][j][k]` symmetric in `(i, j)`, used for hessians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetricTensor {
    size: usize,
    sheets: usize,
    data: Vec<f64>,
}

impl SymmetricTensor {
    /// Creates a zero tensor of shape `size x size x sheets`.
    pub fn zeros(size: usize, sheets: usize) -> Self {
        Self {
            size,
            sheets,
            data: vec![0.0; size * size * sheets],
        }
    }

    /// Number of rows (and columns) of each sheet.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of sheets.
    pub fn sheets(&self) -> usize {
        self.sheets
    }

    /// Returns element `(i, j, k)`.
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[(k * self.size + i) * self.size + j]
    }

    /// Sets element `(i, j, k)` and its mirror `(j, i, k)`.
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: f64) {
        self.data[(k * self.size + i) * self.size + j] = value;
        self.data[(k * self.size + j) * self.size + i] = value;
    }

    /// Returns sheet `k` as a matrix.
    pub fn sheet(&self, k: usize) -> Matrix {
        Matrix::from_fn(self.size, self.size, |i, j| self.get(i, j, k))
    }
}
