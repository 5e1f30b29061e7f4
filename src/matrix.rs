/**
 * RecoRank
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use fnv::FnvHashMap;
use nalgebra::DMatrix;

use crate::error::{Error, Result};
use crate::stats::{DataDictionary, KeyIndex, KeyOrder};
use crate::types::{self, Axis, DenseVector, Observation, SparseVector};

/// What the scoring code needs from a matrix. Cells which were never observed read as 0.
///
/// All sums run in ascending index order, so that dense and sparse backing stores produce
/// identical scores for identical contents.
pub trait Matrix {

    fn num_rows(&self) -> usize;

    fn num_columns(&self) -> usize;

    fn get(&self, row: usize, column: usize) -> f64;

    fn row_vector(&self, row: usize) -> DenseVector {
        (0..self.num_columns()).map(|column| self.get(row, column)).collect()
    }

    fn column_vector(&self, column: usize) -> DenseVector {
        (0..self.num_rows()).map(|row| self.get(row, column)).collect()
    }

    fn row_dot(&self, row: usize, query: &[f64]) -> f64 {
        let mut sum = 0.0;
        for (column, value) in query.iter().enumerate() {
            sum += self.get(row, column) * value;
        }
        sum
    }

    fn column_dot(&self, column: usize, query: &[f64]) -> f64 {
        let mut sum = 0.0;
        for (row, value) in query.iter().enumerate() {
            sum += self.get(row, column) * value;
        }
        sum
    }

    fn len(&self, axis: Axis) -> usize {
        match axis {
            Axis::Rows => self.num_rows(),
            Axis::Columns => self.num_columns(),
        }
    }

    /// Length of the vectors along `axis`, i.e. the dimensionality a query needs.
    fn dimensions(&self, axis: Axis) -> usize {
        match axis {
            Axis::Rows => self.num_columns(),
            Axis::Columns => self.num_rows(),
        }
    }

    fn vector(&self, axis: Axis, index: usize) -> DenseVector {
        match axis {
            Axis::Rows => self.row_vector(index),
            Axis::Columns => self.column_vector(index),
        }
    }

    fn dot(&self, axis: Axis, index: usize, query: &[f64]) -> f64 {
        match axis {
            Axis::Rows => self.row_dot(index, query),
            Axis::Columns => self.column_dot(index, query),
        }
    }
}

/// Dense matrix, every cell is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    values: DMatrix<f64>,
}

impl DenseMatrix {

    pub fn zeros(num_rows: usize, num_columns: usize) -> Self {
        DenseMatrix { values: DMatrix::zeros(num_rows, num_columns) }
    }

    pub fn from_rows(rows: Vec<DenseVector>) -> Result<Self> {
        let num_rows = rows.len();
        let num_columns = rows.first().map(|row| row.len()).unwrap_or(0);

        let mut values = Vec::with_capacity(num_rows * num_columns);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != num_columns {
                return Err(Error::InvalidArgument(format!(
                    "row {} has {} values, expected {}", index, row.len(), num_columns)));
            }
            values.extend(row);
        }

        Ok(DenseMatrix { values: DMatrix::from_row_slice(num_rows, num_columns, &values) })
    }

    pub fn set(&mut self, row: usize, column: usize, value: f64) {
        self.values[(row, column)] = value;
    }
}

impl From<DMatrix<f64>> for DenseMatrix {
    fn from(values: DMatrix<f64>) -> Self {
        DenseMatrix { values }
    }
}

impl Matrix for DenseMatrix {

    fn num_rows(&self) -> usize {
        self.values.nrows()
    }

    fn num_columns(&self) -> usize {
        self.values.ncols()
    }

    fn get(&self, row: usize, column: usize) -> f64 {
        self.values[(row, column)]
    }

    fn row_vector(&self, row: usize) -> DenseVector {
        self.values.row(row).iter().cloned().collect()
    }

    fn column_vector(&self, column: usize) -> DenseVector {
        self.values.column(column).iter().cloned().collect()
    }

    fn column_dot(&self, column: usize, query: &[f64]) -> f64 {
        let mut sum = 0.0;
        for (value, other) in self.values.column(column).iter().zip(query.iter()) {
            sum += value * other;
        }
        sum
    }
}

/// Row-wise sparse matrix which only stores the non-zero cells, for inputs where a dense
/// representation would waste too much memory.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    num_columns: usize,
    rows: Vec<SparseVector>,
}

impl SparseMatrix {

    pub fn row_entries(&self, row: usize) -> &SparseVector {
        &self.rows[row]
    }
}

impl Matrix for SparseMatrix {

    fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn num_columns(&self) -> usize {
        self.num_columns
    }

    fn get(&self, row: usize, column: usize) -> f64 {
        let entries = &self.rows[row];
        match entries.binary_search_by_key(&(column as u32), |&(index, _)| index) {
            Ok(position) => entries[position].1,
            Err(_) => 0.0,
        }
    }

    fn row_vector(&self, row: usize) -> DenseVector {
        let mut vector = types::new_dense_vector(self.num_columns);
        for &(column, value) in self.rows[row].iter() {
            vector[column as usize] = value;
        }
        vector
    }

    fn row_dot(&self, row: usize, query: &[f64]) -> f64 {
        let mut sum = 0.0;
        for &(column, value) in self.rows[row].iter() {
            if let Some(other) = query.get(column as usize) {
                sum += value * other;
            }
        }
        sum
    }

    fn column_dot(&self, column: usize, query: &[f64]) -> f64 {
        let mut sum = 0.0;
        for (row, other) in query.iter().enumerate() {
            let value = self.get(row, column);
            if value != 0.0 {
                sum += value * other;
            }
        }
        sum
    }
}

/// A matrix together with the identifiers of its rows and columns. Built once, never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct IndexedMatrix<M> {
    matrix: M,
    row_index: KeyIndex,
    column_index: KeyIndex,
}

impl<M: Matrix> IndexedMatrix<M> {

    pub fn new(matrix: M, row_index: KeyIndex, column_index: KeyIndex) -> Result<Self> {
        if matrix.num_rows() != row_index.len() || matrix.num_columns() != column_index.len() {
            return Err(Error::InvalidArgument(format!(
                "matrix of shape {}x{} does not match an index of {} rows and {} columns",
                matrix.num_rows(), matrix.num_columns(), row_index.len(), column_index.len())));
        }
        Ok(IndexedMatrix { matrix, row_index, column_index })
    }

    pub fn matrix(&self) -> &M {
        &self.matrix
    }

    pub fn row_index(&self) -> &KeyIndex {
        &self.row_index
    }

    pub fn column_index(&self) -> &KeyIndex {
        &self.column_index
    }

    pub fn index(&self, axis: Axis) -> &KeyIndex {
        match axis {
            Axis::Rows => &self.row_index,
            Axis::Columns => &self.column_index,
        }
    }

    pub fn position(&self, axis: Axis, key: &str) -> Result<usize> {
        self.index(axis).position(key)
    }
}

impl IndexedMatrix<DenseMatrix> {

    /// Wraps precomputed feature vectors (word counts, TF-IDF weights, averaged word
    /// embeddings), one row per identifier.
    pub fn from_feature_rows(
        ids: Vec<String>,
        feature_names: Vec<String>,
        rows: Vec<DenseVector>,
    ) -> Result<Self> {

        if rows.is_empty() {
            return Err(Error::EmptyInput);
        }

        let row_index = KeyIndex::from_keys(ids.iter().map(|id| id.as_str()), KeyOrder::FirstSeen);
        if row_index.len() != ids.len() {
            return Err(Error::InvalidArgument("feature rows have duplicate ids".to_owned()));
        }

        let column_index = KeyIndex::from_keys(
            feature_names.iter().map(|name| name.as_str()), KeyOrder::FirstSeen);

        IndexedMatrix::new(DenseMatrix::from_rows(rows)?, row_index, column_index)
    }
}

/// Turns sparse observations into a matrix, filling unobserved cells with 0. Repeated
/// (row, column) pairs overwrite each other, the last observation wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixBuilder {
    order: KeyOrder,
}

impl MatrixBuilder {

    pub fn new(order: KeyOrder) -> Self {
        MatrixBuilder { order }
    }

    pub fn build_dense(&self, observations: &[Observation]) -> Result<IndexedMatrix<DenseMatrix>> {

        let data_dict = DataDictionary::from_observations(observations, self.order)?;
        let (row_index, column_index) = data_dict.into_indexes();

        let mut matrix = DenseMatrix::zeros(row_index.len(), column_index.len());

        for observation in observations {
            let row = row_index.position(&observation.row)?;
            let column = column_index.position(&observation.column)?;
            matrix.set(row, column, observation.value);
        }

        IndexedMatrix::new(matrix, row_index, column_index)
    }

    pub fn build_sparse(&self, observations: &[Observation]) -> Result<IndexedMatrix<SparseMatrix>> {

        let data_dict = DataDictionary::from_observations(observations, self.order)?;
        let (row_index, column_index) = data_dict.into_indexes();

        let mut cells: Vec<FnvHashMap<u32, f64>> =
            vec![FnvHashMap::with_capacity_and_hasher(10, Default::default()); row_index.len()];

        for observation in observations {
            let row = row_index.position(&observation.row)?;
            let column = column_index.position(&observation.column)?;
            cells[row].insert(column as u32, observation.value);
        }

        let rows: Vec<SparseVector> = cells.into_iter()
            .map(|row| {
                let mut entries: SparseVector = row.into_iter()
                    .filter(|&(_, value)| value != 0.0)
                    .collect();
                entries.sort_by_key(|&(column, _)| column);
                entries
            })
            .collect();

        let matrix = SparseMatrix { num_columns: column_index.len(), rows };

        IndexedMatrix::new(matrix, row_index, column_index)
    }
}
