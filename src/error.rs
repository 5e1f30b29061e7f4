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

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the scoring and ranking entry points. Nothing is retried, all
/// computations are deterministic.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no observations to build a matrix from")]
    EmptyInput,
    #[error("unknown key: {0}")]
    MissingKey(String),
    #[error("embedding rank {rank} must be positive and smaller than min({rows}, {columns})")]
    RankTooLarge {
        rank: usize,
        rows: usize,
        columns: usize,
    },
    #[error("cannot rank an empty score vector")]
    EmptyScore,
    #[error("no neighbor contributes a score for column {0}")]
    UndefinedAggregate(usize),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn missing_key<K: ToString + ?Sized>(key: &K) -> Self {
        Error::MissingKey(key.to_string())
    }
}
