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
use serde_derive::Deserialize;

use crate::error::{Error, Result};
use crate::types::Observation;

/// How the distinct keys of an index are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyOrder {
    /// Lexicographic order of the keys.
    #[default]
    Sorted,
    /// Order of first appearance in the input.
    FirstSeen,
}

/// Bidirectional mapping between string identifiers and consecutive integer positions.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyIndex {
    keys: Vec<String>,
    positions: FnvHashMap<String, usize>,
}

impl KeyIndex {

    pub fn from_keys<'a, I>(keys: I, order: KeyOrder) -> Self
        where I: IntoIterator<Item = &'a str> {

        let mut positions: FnvHashMap<String, usize> =
            FnvHashMap::with_capacity_and_hasher(100, Default::default());
        let mut distinct_keys: Vec<String> = Vec::new();

        for key in keys {
            if !positions.contains_key(key) {
                positions.insert(key.to_owned(), distinct_keys.len());
                distinct_keys.push(key.to_owned());
            }
        }

        if order == KeyOrder::Sorted {
            distinct_keys.sort();
            for (position, key) in distinct_keys.iter().enumerate() {
                positions.insert(key.clone(), position);
            }
        }

        KeyIndex { keys: distinct_keys, positions }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    pub fn position(&self, key: &str) -> Result<usize> {
        self.positions.get(key).cloned().ok_or_else(|| Error::missing_key(key))
    }

    pub fn key(&self, position: usize) -> Result<&str> {
        self.keys
            .get(position)
            .map(|key| key.as_str())
            .ok_or_else(|| Error::missing_key(&position))
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

/// Row and column indexes of a set of observations, plus basic statistics which help us
/// size allocations.
#[derive(Debug, Clone)]
pub struct DataDictionary {
    row_index: KeyIndex,
    column_index: KeyIndex,
    num_observations: u64,
}

impl DataDictionary {

    pub fn from_observations(observations: &[Observation], order: KeyOrder) -> Result<Self> {

        if observations.is_empty() {
            return Err(Error::EmptyInput);
        }

        let row_index = KeyIndex::from_keys(
            observations.iter().map(|observation| observation.row.as_str()), order);
        let column_index = KeyIndex::from_keys(
            observations.iter().map(|observation| observation.column.as_str()), order);

        Ok(DataDictionary {
            row_index,
            column_index,
            num_observations: observations.len() as u64,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.row_index.len()
    }

    pub fn num_columns(&self) -> usize {
        self.column_index.len()
    }

    pub fn num_observations(&self) -> u64 {
        self.num_observations
    }

    pub fn row_index(&self) -> &KeyIndex {
        &self.row_index
    }

    pub fn column_index(&self) -> &KeyIndex {
        &self.column_index
    }

    pub fn into_indexes(self) -> (KeyIndex, KeyIndex) {
        (self.row_index, self.column_index)
    }
}
