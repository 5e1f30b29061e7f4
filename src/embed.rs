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

use std::cmp::Ordering;

use nalgebra::{DMatrix, SVD};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_derive::Deserialize;

use crate::error::{Error, Result};
use crate::matrix::{DenseMatrix, Matrix};
use crate::types::{self, DenseVector};

const EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    /// Dimensionality of the embedding.
    pub rank: usize,
    /// Seed for the random projection, fixed so that repeated runs agree.
    pub seed: u64,
    /// Additional random directions sampled beyond `rank`.
    pub oversamples: usize,
    pub power_iterations: usize,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        EmbedderConfig { rank: 10, seed: 42, oversamples: 10, power_iterations: 5 }
    }
}

/// Rank-r latent representation of the rows of a matrix. Has the same rows as its source,
/// every row has unit length (or is zero if its source row carried no signal).
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    rows: DenseMatrix,
    singular_values: DenseVector,
}

impl EmbeddingMatrix {

    pub fn rank(&self) -> usize {
        self.rows.num_columns()
    }

    pub fn singular_values(&self) -> &[f64] {
        &self.singular_values
    }

    pub fn row(&self, row: usize) -> DenseVector {
        self.rows.row_vector(row)
    }
}

impl Matrix for EmbeddingMatrix {

    fn num_rows(&self) -> usize {
        self.rows.num_rows()
    }

    fn num_columns(&self) -> usize {
        self.rows.num_columns()
    }

    fn get(&self, row: usize, column: usize) -> f64 {
        self.rows.get(row, column)
    }

    fn row_vector(&self, row: usize) -> DenseVector {
        self.rows.row_vector(row)
    }
}

/// Truncated SVD via randomized range finding (Halko, Martinsson & Tropp): project onto a
/// seeded random subspace, sharpen it with a few power iterations, and decompose the small
/// projected matrix exactly. The rows of `U * Sigma` are then L2-normalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct Embedder {
    config: EmbedderConfig,
}

impl Embedder {

    pub fn new(config: EmbedderConfig) -> Self {
        Embedder { config }
    }

    pub fn with_rank(rank: usize) -> Self {
        Embedder { config: EmbedderConfig { rank, ..EmbedderConfig::default() } }
    }

    pub fn embed<M: Matrix>(&self, matrix: &M) -> Result<EmbeddingMatrix> {

        let num_rows = matrix.num_rows();
        let num_columns = matrix.num_columns();
        let rank = self.config.rank;

        if rank == 0 {
            return Err(Error::InvalidArgument("embedding rank must be positive".to_owned()));
        }

        if rank >= num_rows.min(num_columns) {
            return Err(Error::RankTooLarge { rank, rows: num_rows, columns: num_columns });
        }

        let num_directions = (rank + self.config.oversamples).min(num_rows.min(num_columns));

        let a: DMatrix<f64> =
            DMatrix::from_fn(num_rows, num_columns, |row, column| matrix.get(row, column));

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let projection: DMatrix<f64> = DMatrix::from_fn(num_columns, num_directions, |_, _| {
            rng.gen_range(-1.0..1.0)
        });

        // Orthonormal basis Q for the range of A
        let mut basis = (&a * &projection).qr().q();

        for _ in 0..self.config.power_iterations {
            let transposed = (a.transpose() * &basis).qr().q();
            basis = (&a * &transposed).qr().q();
        }

        // B = Q^T A has the singular values of A, its left singular vectors are mapped back by Q
        let projected = basis.transpose() * &a;
        let svd = SVD::new(projected, true, false);
        let left_vectors = svd.u.ok_or_else(|| {
            Error::InvalidArgument("SVD did not produce singular vectors".to_owned())
        })?;
        let sigma = svd.singular_values;

        let mut order: Vec<usize> = (0..sigma.len()).collect();
        order.sort_by(|&x, &y| sigma[y].partial_cmp(&sigma[x]).unwrap_or(Ordering::Equal));

        let mut rows: DMatrix<f64> = DMatrix::zeros(num_rows, rank);
        let mut singular_values = types::new_dense_vector(rank);

        for (component, &direction) in order.iter().take(rank).enumerate() {

            let singular_value = sigma[direction].max(0.0);
            singular_values[component] = singular_value;

            let left_vector = &basis * left_vectors.column(direction);

            // Singular vectors are only defined up to sign, we make the largest loading positive
            let sign = largest_loading_sign(left_vector.as_slice());

            rows.set_column(component, &(left_vector * (sign * singular_value)));
        }

        for mut row in rows.row_iter_mut() {
            let norm = row.norm();
            if norm > EPSILON {
                row.unscale_mut(norm);
            } else {
                row.fill(0.0);
            }
        }

        Ok(EmbeddingMatrix { rows: DenseMatrix::from(rows), singular_values })
    }
}

fn largest_loading_sign(vector: &[f64]) -> f64 {
    let mut largest = 0.0_f64;
    for value in vector.iter() {
        if value.abs() > largest.abs() {
            largest = *value;
        }
    }

    if largest < 0.0 { -1.0 } else { 1.0 }
}
