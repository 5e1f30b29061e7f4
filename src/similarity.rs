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

use serde_derive::Deserialize;

use crate::error::{Error, Result};
use crate::matrix::{DenseMatrix, Matrix};
use crate::types::{Axis, ScoreVector};

/// How a row (or column) is compared with the query vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Similarity {
    /// Unbounded inner product.
    DotProduct,
    /// Inner product of the normalized vectors, in [-1, 1]. Zero if either vector is zero.
    Cosine,
    /// Sum of the magnitudes of a vector on the positions where the query is non-zero.
    /// A cheap proxy which rewards any overlap with the query, always >= 0.
    SharedFeatureSum,
}

impl Similarity {

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "dot" | "dot_product" => Ok(Similarity::DotProduct),
            "cosine" => Ok(Similarity::Cosine),
            "shared" | "shared_feature_sum" => Ok(Similarity::SharedFeatureSum),
            _ => Err(Error::InvalidArgument(format!("unknown similarity '{}'", name))),
        }
    }
}

/// Scores every row (or column) of `matrix` against the one at position `query`. The
/// query scores itself too, excluding it is left to the ranking.
pub fn scores<M: Matrix>(
    matrix: &M,
    axis: Axis,
    query: usize,
    similarity: Similarity,
) -> Result<ScoreVector> {

    if query >= matrix.len(axis) {
        return Err(Error::missing_key(&query));
    }

    let query_vector = matrix.vector(axis, query);
    scores_against(matrix, axis, &query_vector, similarity)
}

/// Scores every row (or column) of `matrix` against an arbitrary query vector.
pub fn scores_against<M: Matrix>(
    matrix: &M,
    axis: Axis,
    query: &[f64],
    similarity: Similarity,
) -> Result<ScoreVector> {

    if query.len() != matrix.dimensions(axis) {
        return Err(Error::InvalidArgument(format!(
            "query has {} dimensions, expected {}", query.len(), matrix.dimensions(axis))));
    }

    let num_candidates = matrix.len(axis);

    let scores = match similarity {
        Similarity::DotProduct => {
            (0..num_candidates).map(|index| matrix.dot(axis, index, query)).collect()
        },
        Similarity::Cosine => {
            let query_norm = l2_norm(query);
            (0..num_candidates)
                .map(|index| {
                    let candidate_norm = l2_norm(&matrix.vector(axis, index));
                    normalized(matrix.dot(axis, index, query), candidate_norm, query_norm)
                })
                .collect()
        },
        Similarity::SharedFeatureSum => {
            let shared_positions: Vec<usize> = query.iter()
                .enumerate()
                .filter(|&(_, value)| *value != 0.0)
                .map(|(position, _)| position)
                .collect();

            (0..num_candidates)
                .map(|index| {
                    let mut sum = 0.0;
                    for &position in shared_positions.iter() {
                        sum += cell(matrix, axis, index, position).abs();
                    }
                    sum
                })
                .collect()
        },
    };

    Ok(scores)
}

/// Pairwise similarities between all rows (or all columns) of `matrix`.
pub fn similarity_matrix<M: Matrix>(
    matrix: &M,
    axis: Axis,
    similarity: Similarity,
) -> Result<DenseMatrix> {

    let rows = (0..matrix.len(axis))
        .map(|index| scores(matrix, axis, index, similarity))
        .collect::<Result<Vec<ScoreVector>>>()?;

    DenseMatrix::from_rows(rows)
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    let mut sum = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        sum += x * y;
    }
    sum
}

pub fn l2_norm(vector: &[f64]) -> f64 {
    dot(vector, vector).sqrt()
}

pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    normalized(dot(a, b), l2_norm(a), l2_norm(b))
}

#[inline]
fn normalized(dot_product: f64, norm_a: f64, norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        // Rounding can push parallel vectors slightly outside of the valid range
        (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0)
    }
}

#[inline]
fn cell<M: Matrix>(matrix: &M, axis: Axis, index: usize, position: usize) -> f64 {
    match axis {
        Axis::Rows => matrix.get(index, position),
        Axis::Columns => matrix.get(position, index),
    }
}

#[cfg(test)]
mod tests {

    use proptest::prelude::*;

    use super::*;
    use crate::fixtures;
    use crate::matrix::MatrixBuilder;

    #[test]
    fn cosine_prefers_similar_users() {
        let ratings = fixtures::scenario_ratings();
        let u1 = ratings.row_index().position("u1").unwrap();

        let scores = scores(ratings.matrix(), Axis::Rows, u1, Similarity::Cosine).unwrap();

        assert!((scores[0] - 1.0).abs() < 1e-12);
        assert!(scores[1] > scores[2]);
        assert!((scores[1] - 32.0 / (34.0_f64.sqrt() * 33.0_f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn dot_product_on_columns() {
        let ratings = fixtures::scenario_ratings();

        let scores = scores(ratings.matrix(), Axis::Columns, 0, Similarity::DotProduct).unwrap();

        assert_eq!(scores, vec![41.0, 31.0, 4.0]);
    }

    #[test]
    fn shared_feature_sum_only_counts_query_positions() {
        let ratings = fixtures::scenario_ratings();

        let scores = scores(ratings.matrix(), Axis::Rows, 0, Similarity::SharedFeatureSum)
            .unwrap();

        // u1 is non-zero on i1 and i2 only, so i3 never contributes
        assert_eq!(scores, vec![8.0, 8.0, 2.0]);
    }

    #[test]
    fn zero_vectors_have_zero_cosine() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine(&[1.0, 2.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn out_of_range_query_is_a_missing_key() {
        let ratings = fixtures::scenario_ratings();

        assert!(matches!(
            scores(ratings.matrix(), Axis::Rows, 3, Similarity::Cosine),
            Err(Error::MissingKey(_))
        ));
        assert!(matches!(
            scores_against(ratings.matrix(), Axis::Rows, &[1.0], Similarity::Cosine),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn similarity_matrix_is_symmetric() {
        let ratings = fixtures::scenario_ratings();

        let sims = similarity_matrix(ratings.matrix(), Axis::Rows, Similarity::Cosine).unwrap();

        for a in 0..3 {
            for b in 0..3 {
                assert!((sims.get(a, b) - sims.get(b, a)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn similarities_parse_from_names() {
        assert_eq!(Similarity::from_name("cosine").unwrap(), Similarity::Cosine);
        assert_eq!(Similarity::from_name("dot").unwrap(), Similarity::DotProduct);
        assert_eq!(Similarity::from_name("shared").unwrap(), Similarity::SharedFeatureSum);
        assert!(Similarity::from_name("jaccard").is_err());
    }

    proptest! {
        #[test]
        fn bounded_and_deterministic_scores(
            cells in proptest::collection::vec((0u8..6, 0u8..5, -5.0f64..5.0), 1..40),
            query in 0usize..6,
        ) {
            let observations = fixtures::observations_from_cells(&cells);
            let ratings = MatrixBuilder::default().build_sparse(&observations).unwrap();
            let query = query % ratings.matrix().num_rows();

            let cosine_scores = scores(ratings.matrix(), Axis::Rows, query, Similarity::Cosine)
                .unwrap();
            for score in cosine_scores.iter() {
                prop_assert!(*score >= -1.0 && *score <= 1.0);
            }

            let shared = scores(ratings.matrix(), Axis::Rows, query, Similarity::SharedFeatureSum)
                .unwrap();
            for score in shared.iter() {
                prop_assert!(*score >= 0.0);
            }

            let again = scores(ratings.matrix(), Axis::Rows, query, Similarity::Cosine).unwrap();
            prop_assert_eq!(cosine_scores, again);
        }
    }
}
