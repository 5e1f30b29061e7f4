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

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_derive::Deserialize;

use crate::embed::EmbedderConfig;
use crate::error::{Error, Result};
use crate::similarity::Similarity;
use crate::stats::KeyOrder;

/// Backing store of the ratings matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Storage {
    /// Every cell is stored, unobserved ratings as 0.
    #[default]
    Dense,
    /// Only the observed, non-zero ratings are stored.
    Sparse,
}

/// Settings of a `Recommender`. Every field has a default, so a JSON file only needs to
/// name the ones it changes, e.g. `{"neighbors": 20, "embedding": {"rank": 5}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Order of the row and column identifiers of the ratings matrix.
    pub key_order: KeyOrder,
    pub storage: Storage,
    /// Number of similar users whose ratings are aggregated per prediction.
    pub neighbors: usize,
    /// Number of recommendations returned when the caller does not ask for a count.
    pub num_recommendations: usize,
    /// Similarity used for content-based recommendations.
    pub content_similarity: Similarity,
    /// Factorize the ratings matrix on construction to enable model-based recommendations.
    pub factorize: bool,
    pub embedding: EmbedderConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            key_order: KeyOrder::Sorted,
            storage: Storage::Dense,
            neighbors: 10,
            num_recommendations: 10,
            content_similarity: Similarity::Cosine,
            factorize: false,
            embedding: EmbedderConfig::default(),
        }
    }
}

impl EngineConfig {

    pub fn validate(&self) -> Result<()> {
        if self.neighbors == 0 {
            return Err(Error::InvalidArgument("neighbors must be positive".to_owned()));
        }
        if self.num_recommendations == 0 {
            return Err(Error::InvalidArgument("num_recommendations must be positive".to_owned()));
        }
        if self.embedding.rank == 0 {
            return Err(Error::InvalidArgument("embedding rank must be positive".to_owned()));
        }
        Ok(())
    }
}

/// Reads and validates a JSON configuration file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<EngineConfig> {
    let reader = BufReader::new(File::open(path)?);
    from_reader(reader)
}

pub fn from_reader<R: std::io::Read>(reader: R) -> Result<EngineConfig> {
    let config: EngineConfig = serde_json::from_reader(reader)?;
    config.validate()?;
    Ok(config)
}
