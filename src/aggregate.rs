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

use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::stats::{KeyIndex, KeyOrder};
use crate::types::{self, Observation, ScoreVector};

/// Per-column predictions derived from a set of neighbors. Columns which none of the
/// neighbors has a value for carry no score at all.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateScores {
    scores: Vec<Option<f64>>,
}

impl AggregateScores {

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn is_defined(&self, column: usize) -> bool {
        matches!(self.scores.get(column), Some(Some(_)))
    }

    pub fn score(&self, column: usize) -> Result<f64> {
        match self.scores.get(column) {
            Some(Some(score)) => Ok(*score),
            Some(None) => Err(Error::UndefinedAggregate(column)),
            None => Err(Error::missing_key(&column)),
        }
    }

    /// Score vector for ranking, undefined columns are NaN and never get ranked.
    pub fn to_score_vector(&self) -> ScoreVector {
        self.scores.iter().map(|score| score.unwrap_or(f64::NAN)).collect()
    }
}

/// Averages the values of the `neighbors` rows per column. Only neighbors with a non-zero
/// value at a column count towards its average, so an item rated by one of three neighbors
/// gets that neighbor's rating, not a third of it.
pub fn neighbor_average<M: Matrix>(matrix: &M, neighbors: &[usize]) -> Result<AggregateScores> {

    let num_columns = matrix.num_columns();
    let mut sums = types::new_dense_vector(num_columns);
    let mut counts: Vec<u32> = vec![0; num_columns];

    for &neighbor in neighbors {
        if neighbor >= matrix.num_rows() {
            return Err(Error::missing_key(&neighbor));
        }

        for (column, value) in matrix.row_vector(neighbor).into_iter().enumerate() {
            if value != 0.0 {
                sums[column] += value;
                counts[column] += 1;
            }
        }
    }

    let scores = sums.into_iter()
        .zip(counts.into_iter())
        .map(|(sum, count)| if count > 0 { Some(sum / count as f64) } else { None })
        .collect();

    Ok(AggregateScores { scores })
}

/// Mean value per column over the given observations. Columns appear in `order`.
pub fn group_mean<'a, I>(observations: I, order: KeyOrder) -> Vec<(String, f64)>
    where I: IntoIterator<Item = &'a Observation> {

    let observations: Vec<&Observation> = observations.into_iter().collect();

    let columns = KeyIndex::from_keys(
        observations.iter().map(|observation| observation.column.as_str()), order);

    let mut sums = types::new_dense_vector(columns.len());
    let mut counts: Vec<u32> = vec![0; columns.len()];

    for observation in observations.iter() {
        if let Ok(column) = columns.position(&observation.column) {
            sums[column] += observation.value;
            counts[column] += 1;
        }
    }

    columns.keys()
        .iter()
        .zip(sums.into_iter().zip(counts.into_iter()))
        .map(|(column, (sum, count))| (column.clone(), sum / count as f64))
        .collect()
}

/// Mean value per column, restricted to the observations made in `context`.
pub fn context_mean(
    observations: &[Observation],
    context: &str,
    order: KeyOrder,
) -> Result<Vec<(String, f64)>> {

    let in_context: Vec<&Observation> = observations.iter()
        .filter(|observation| observation.context.as_deref() == Some(context))
        .collect();

    if in_context.is_empty() {
        return Err(Error::missing_key(context));
    }

    Ok(group_mean(in_context, order))
}

/// The columns a row has values for, with those values, in observation order.
pub fn row_history(observations: &[Observation], row: &str) -> Result<Vec<(String, f64)>> {

    let history: Vec<(String, f64)> = observations.iter()
        .filter(|observation| observation.row == row)
        .map(|observation| (observation.column.clone(), observation.value))
        .collect();

    if history.is_empty() {
        return Err(Error::missing_key(row));
    }

    Ok(history)
}
