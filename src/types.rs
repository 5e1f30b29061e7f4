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

use fnv::FnvHashSet;

pub type DenseVector = Vec<f64>;

/// One score per row (or column) of the matrix it was computed from, same order.
pub type ScoreVector = Vec<f64>;

/// Ordered identifiers, best first.
pub type RankedList = Vec<String>;

/// Non-zero entries of a row, sorted by column index.
pub type SparseVector = Vec<(u32, f64)>;

pub type IndexSet = FnvHashSet<usize>;

/// A single observed (row, column, value) cell, e.g. a user rating an item, optionally
/// tagged with the context it was observed in.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub row: String,
    pub column: String,
    pub value: f64,
    pub context: Option<String>,
}

impl Observation {

    pub fn new<R: Into<String>, C: Into<String>>(row: R, column: C, value: f64) -> Self {
        Observation { row: row.into(), column: column.into(), value, context: None }
    }

    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Which side of a matrix is scored: rows are compared with rows, columns with columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Rows,
    Columns,
}

pub fn new_dense_vector(dimensions: usize) -> DenseVector {
    vec![0.0; dimensions]
}

pub fn new_index_set(capacity: usize) -> IndexSet {
    FnvHashSet::with_capacity_and_hasher(capacity, Default::default())
}
