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

use crate::aggregate;
use crate::config::EngineConfig;
use crate::demographic::{self, Demographics};
use crate::embed::{Embedder, EmbeddingMatrix};
use crate::error::{Error, Result};
use crate::hybrid;
use crate::matrix::{DenseMatrix, IndexedMatrix, Matrix, MatrixBuilder, SparseMatrix};
use crate::rank;
use crate::similarity::{self, Similarity};
use crate::stats::{KeyIndex, KeyOrder};
use crate::types::{self, Axis, IndexSet, Observation, RankedList};

/// The ways a `Recommender` can answer a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Query is an item, answers items with the largest rating dot product.
    ItemBased,
    /// Query is a user, answers items rated highly by the most cosine-similar users.
    UserBased,
    /// Like `UserBased`, with the similarity computed in the factorized space.
    ModelBased,
    /// Query is a context, answers items with the highest mean rating in that context.
    Context,
    /// Query is a user, merges the ranking of the given context with the user's favourites.
    Hybrid(String),
    /// Query is a user, answers items rated highest by users of the same age and gender.
    DemographicMean,
    /// Query is a user, answers the favourites of users of the same age and gender.
    DemographicFavourites,
}

impl Strategy {

    pub fn from_name(name: &str, context: Option<&str>) -> Result<Self> {
        match name {
            "item" => Ok(Strategy::ItemBased),
            "user" => Ok(Strategy::UserBased),
            "model" => Ok(Strategy::ModelBased),
            "context" => Ok(Strategy::Context),
            "hybrid" => match context {
                Some(context) => Ok(Strategy::Hybrid(context.to_owned())),
                None => Err(Error::InvalidArgument(
                    "the hybrid strategy needs a context".to_owned())),
            },
            "demographic" => Ok(Strategy::DemographicMean),
            "favourites" => Ok(Strategy::DemographicFavourites),
            _ => Err(Error::InvalidArgument(format!("unknown strategy '{}'", name))),
        }
    }
}

/// Recommendations from a ratings matrix which is built once on construction and shared
/// read-only by all queries afterwards. The ratings are held dense by default, see
/// `Recommender::new_sparse` for inputs where most ratings are missing.
#[derive(Debug)]
pub struct Recommender<M = DenseMatrix> {
    config: EngineConfig,
    observations: Vec<Observation>,
    ratings: IndexedMatrix<M>,
    embedding: Option<EmbeddingMatrix>,
    demographics: Option<Demographics>,
}

impl Recommender<DenseMatrix> {

    pub fn new(observations: Vec<Observation>, config: EngineConfig) -> Result<Self> {
        let ratings = MatrixBuilder::new(config.key_order).build_dense(&observations)?;
        Recommender::from_ratings(ratings, observations, config)
    }
}

impl Recommender<SparseMatrix> {

    /// Like `new`, but only stores the observed ratings.
    pub fn new_sparse(observations: Vec<Observation>, config: EngineConfig) -> Result<Self> {
        let ratings = MatrixBuilder::new(config.key_order).build_sparse(&observations)?;
        Recommender::from_ratings(ratings, observations, config)
    }
}

impl<M: Matrix> Recommender<M> {

    /// Wraps an already built ratings matrix, `observations` must be the ones it was built from.
    pub fn from_ratings(
        ratings: IndexedMatrix<M>,
        observations: Vec<Observation>,
        config: EngineConfig,
    ) -> Result<Self> {

        config.validate()?;

        let embedding = if config.factorize {
            Some(Embedder::new(config.embedding).embed(ratings.matrix())?)
        } else {
            None
        };

        Ok(Recommender { config, observations, ratings, embedding, demographics: None })
    }

    pub fn with_demographics(mut self, demographics: Demographics) -> Self {
        self.demographics = Some(demographics);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ratings(&self) -> &IndexedMatrix<M> {
        &self.ratings
    }

    pub fn embedding(&self) -> Option<&EmbeddingMatrix> {
        self.embedding.as_ref()
    }

    /// Distinct contexts of the observations, in order of first appearance.
    pub fn contexts(&self) -> Vec<String> {
        let contexts = KeyIndex::from_keys(
            self.observations.iter().filter_map(|observation| observation.context.as_deref()),
            KeyOrder::FirstSeen);

        contexts.keys().to_vec()
    }

    /// The identifiers a strategy accepts as query, used to run it for everyone at once.
    pub fn query_keys(&self, strategy: &Strategy) -> Result<Vec<String>> {
        match *strategy {
            Strategy::ItemBased => Ok(self.ratings.column_index().keys().to_vec()),
            Strategy::Context => Ok(self.contexts()),
            Strategy::DemographicMean | Strategy::DemographicFavourites => {
                let demographics = self.demographics()?;
                Ok(self.ratings.row_index().keys()
                    .iter()
                    .filter(|user| demographics.profile(user).is_ok())
                    .cloned()
                    .collect())
            },
            _ => Ok(self.ratings.row_index().keys().to_vec()),
        }
    }

    pub fn recommend(&self, strategy: &Strategy, query: &str, n: usize) -> Result<RankedList> {
        match *strategy {
            Strategy::ItemBased => self.item_based(query, n),
            Strategy::UserBased => self.user_based(query, n),
            Strategy::ModelBased => self.model_based(query, n),
            Strategy::Context => self.context_based(query, n),
            Strategy::Hybrid(ref context) => self.hybrid(query, context, n),
            Strategy::DemographicMean => self.demographic_mean(query, n),
            Strategy::DemographicFavourites => self.demographic_favourites(query, n),
        }
    }

    pub fn item_based(&self, item: &str, n: usize) -> Result<RankedList> {

        let position = self.ratings.position(Axis::Columns, item)?;

        let scores = similarity::scores(
            self.ratings.matrix(), Axis::Columns, position, Similarity::DotProduct)?;

        rank::rank_keys(self.ratings.column_index(), &scores, &single(position), n)
    }

    /// The `n` users with the most similar ratings, by cosine similarity.
    pub fn similar_users(&self, user: &str, n: usize) -> Result<RankedList> {

        let position = self.ratings.position(Axis::Rows, user)?;
        let neighbors = self.neighbors(self.ratings.matrix(), position, Similarity::Cosine, n)?;

        neighbors.into_iter()
            .map(|neighbor| self.ratings.row_index().key(neighbor).map(|key| key.to_owned()))
            .collect()
    }

    pub fn user_based(&self, user: &str, n: usize) -> Result<RankedList> {

        let position = self.ratings.position(Axis::Rows, user)?;
        let neighbors = self.neighbors(
            self.ratings.matrix(), position, Similarity::Cosine, self.config.neighbors)?;

        self.predict(position, &neighbors, n)
    }

    pub fn model_based(&self, user: &str, n: usize) -> Result<RankedList> {

        let embedding = self.embedding.as_ref().ok_or_else(|| {
            Error::InvalidArgument("model-based recommendations need factorize enabled".to_owned())
        })?;

        let position = self.ratings.position(Axis::Rows, user)?;
        let neighbors = self.neighbors(
            embedding, position, Similarity::DotProduct, self.config.neighbors)?;

        self.predict(position, &neighbors, n)
    }

    pub fn context_based(&self, context: &str, n: usize) -> Result<RankedList> {

        let means = aggregate::context_mean(&self.observations, context, self.config.key_order)?;

        rank::rank_scored(&means, &[], n)
    }

    pub fn hybrid(&self, user: &str, context: &str, n: usize) -> Result<RankedList> {

        let means = aggregate::context_mean(&self.observations, context, self.config.key_order)?;
        let context_items = rank::rank_scored(&means, &[], means.len())?;

        let mut history = aggregate::row_history(&self.observations, user)?;
        history.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        let user_items: Vec<String> = history.into_iter().map(|(item, _)| item).collect();

        Ok(hybrid::combine(&context_items, &user_items, n))
    }

    pub fn demographic_mean(&self, user: &str, n: usize) -> Result<RankedList> {
        demographic::mean_rating(
            &self.observations, self.demographics()?, user, n, self.config.key_order)
    }

    pub fn demographic_favourites(&self, user: &str, n: usize) -> Result<RankedList> {
        demographic::favourites(self.demographics()?, user, n)
    }

    fn demographics(&self) -> Result<&Demographics> {
        self.demographics.as_ref().ok_or_else(|| {
            Error::InvalidArgument("no demographics available".to_owned())
        })
    }

    /// Rows most similar to `row` in `matrix`, excluding `row` itself.
    fn neighbors<S: Matrix>(
        &self,
        matrix: &S,
        row: usize,
        similarity: Similarity,
        num_neighbors: usize,
    ) -> Result<Vec<usize>> {

        let scores = similarity::scores(matrix, Axis::Rows, row, similarity)?;
        rank::rank(&scores, &single(row), num_neighbors)
    }

    /// Ranks the items the neighbors rated, leaving out the ones `row` rated already.
    fn predict(&self, row: usize, neighbors: &[usize], n: usize) -> Result<RankedList> {

        let aggregate = aggregate::neighbor_average(self.ratings.matrix(), neighbors)?;

        let rated: IndexSet = self.ratings.matrix()
            .row_vector(row)
            .into_iter()
            .enumerate()
            .filter(|&(_, value)| value != 0.0)
            .map(|(column, _)| column)
            .collect();

        rank::rank_keys(self.ratings.column_index(), &aggregate.to_score_vector(), &rated, n)
    }
}

/// Recommendations from precomputed item features, e.g. word counts, TF-IDF weights or
/// averaged word embeddings of item descriptions.
#[derive(Debug)]
pub struct ContentRecommender {
    features: IndexedMatrix<DenseMatrix>,
    similarity: Similarity,
}

impl ContentRecommender {

    pub fn new(features: IndexedMatrix<DenseMatrix>, similarity: Similarity) -> Self {
        ContentRecommender { features, similarity }
    }

    pub fn items(&self) -> &[String] {
        self.features.row_index().keys()
    }

    pub fn similar_items(&self, item: &str, n: usize) -> Result<RankedList> {
        self.similar_items_with(item, n, self.similarity)
    }

    pub fn similar_items_with(&self, item: &str, n: usize, similarity: Similarity)
        -> Result<RankedList> {

        let position = self.features.position(Axis::Rows, item)?;
        let scores = similarity::scores(self.features.matrix(), Axis::Rows, position, similarity)?;

        rank::rank_keys(self.features.row_index(), &scores, &single(position), n)
    }
}

fn single(position: usize) -> IndexSet {
    let mut set = types::new_index_set(1);
    set.insert(position);
    set
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::embed::EmbedderConfig;
    use crate::fixtures;
    use crate::demographic::Profile;

    fn scenario() -> Recommender {
        Recommender::new(fixtures::scenario_observations(), EngineConfig::default()).unwrap()
    }

    #[test]
    fn similar_users_by_cosine() {
        assert_eq!(scenario().similar_users("u1", 2).unwrap(), vec!["u2", "u3"]);
        assert!(matches!(scenario().similar_users("u9", 2), Err(Error::MissingKey(_))));
    }

    #[test]
    fn item_based_excludes_the_query() {
        let ranked = scenario().item_based("i1", 10).unwrap();

        assert_eq!(ranked, vec!["i2", "i3"]);
        assert!(scenario().item_based("i1", 0).unwrap().is_empty());
    }

    #[test]
    fn user_based_predicts_unrated_items() {
        // u2 and u3 rated i3 with 1 and 5, u1 has not rated it
        assert_eq!(scenario().user_based("u1", 10).unwrap(), vec!["i3"]);
        // u3 has not rated i1, only u1 and u2 did
        assert_eq!(scenario().user_based("u3", 10).unwrap(), vec!["i1"]);
    }

    #[test]
    fn user_based_never_returns_rated_items() {
        let recommender = scenario();

        for user in recommender.ratings().row_index().keys() {
            let rated: Vec<String> = aggregate::row_history(&fixtures::scenario_observations(), user)
                .unwrap()
                .into_iter()
                .map(|(item, _)| item)
                .collect();

            for item in recommender.user_based(user, 10).unwrap() {
                assert!(!rated.contains(&item));
            }
        }
    }

    #[test]
    fn unbounded_n_returns_every_candidate() {
        let recommender = scenario();

        assert_eq!(recommender.user_based("u1", usize::MAX).unwrap(), vec!["i3"]);
        assert_eq!(recommender.item_based("i1", usize::MAX).unwrap(), vec!["i2", "i3"]);
    }

    #[test]
    fn sparse_ratings_recommend_like_dense_ones() {
        let config = EngineConfig {
            factorize: true,
            embedding: EmbedderConfig { rank: 2, ..EmbedderConfig::default() },
            ..EngineConfig::default()
        };

        let dense = Recommender::new(fixtures::context_observations(), config).unwrap();
        let sparse = Recommender::new_sparse(fixtures::context_observations(), config).unwrap();

        for strategy in &[Strategy::ItemBased, Strategy::UserBased, Strategy::ModelBased] {
            for query in dense.query_keys(strategy).unwrap() {
                assert_eq!(
                    dense.recommend(strategy, &query, 3).unwrap(),
                    sparse.recommend(strategy, &query, 3).unwrap());
            }
        }

        assert_eq!(dense.hybrid("bob", "outdoor", 3).unwrap(),
            sparse.hybrid("bob", "outdoor", 3).unwrap());
    }

    #[test]
    fn model_based_uses_latent_neighbors() {
        let observations = vec![
            Observation::new("u1", "a", 5.0),
            Observation::new("u1", "b", 5.0),
            Observation::new("u2", "a", 5.0),
            Observation::new("u3", "c", 3.0),
            Observation::new("u3", "d", 3.0),
            Observation::new("u4", "c", 3.0),
            Observation::new("u4", "d", 3.0),
        ];

        let config = EngineConfig {
            factorize: true,
            embedding: EmbedderConfig { rank: 2, ..EmbedderConfig::default() },
            ..EngineConfig::default()
        };

        let recommender = Recommender::new(observations, config).unwrap();

        assert_eq!(recommender.model_based("u2", 1).unwrap(), vec!["b"]);
    }

    #[test]
    fn model_based_needs_an_embedding() {
        assert!(matches!(scenario().model_based("u1", 3), Err(Error::InvalidArgument(_))));

        let config = EngineConfig { factorize: true, ..EngineConfig::default() };
        assert!(matches!(
            Recommender::new(fixtures::scenario_observations(), config),
            Err(Error::RankTooLarge { .. })
        ));
    }

    #[test]
    fn context_and_hybrid() {
        let recommender =
            Recommender::new(fixtures::context_observations(), EngineConfig::default()).unwrap();

        assert_eq!(recommender.contexts(), vec!["outdoor", "indoor"]);
        assert_eq!(recommender.context_based("outdoor", 10).unwrap(), vec!["tent", "bike", "kite"]);
        assert_eq!(recommender.hybrid("bob", "outdoor", 3).unwrap(), vec!["tent", "bike", "book"]);
        assert!(matches!(recommender.context_based("space", 3), Err(Error::MissingKey(_))));
    }

    #[test]
    fn strategies_dispatch() {
        let mut demographics = Demographics::new();
        demographics.insert("alice", Profile {
            age: 30, gender: "f".to_owned(), favourites: vec!["kite".to_owned()] });
        demographics.insert("carol", Profile {
            age: 30, gender: "f".to_owned(), favourites: vec!["tent".to_owned()] });

        let recommender =
            Recommender::new(fixtures::context_observations(), EngineConfig::default())
                .unwrap()
                .with_demographics(demographics);

        let favourites = Strategy::from_name("favourites", None).unwrap();
        assert_eq!(recommender.query_keys(&favourites).unwrap(), vec!["alice", "carol"]);
        assert_eq!(recommender.recommend(&favourites, "alice", 5).unwrap(), vec!["tent"]);

        let hybrid = Strategy::from_name("hybrid", Some("outdoor")).unwrap();
        assert_eq!(recommender.recommend(&hybrid, "bob", 3).unwrap(),
            recommender.hybrid("bob", "outdoor", 3).unwrap());

        assert!(Strategy::from_name("hybrid", None).is_err());
        assert!(Strategy::from_name("random", None).is_err());
    }

    #[test]
    fn content_based_modes() {
        let features = IndexedMatrix::from_feature_rows(
            vec!["doc1".to_owned(), "doc2".to_owned(), "doc3".to_owned()],
            vec!["machine".to_owned(), "learning".to_owned(), "neural".to_owned()],
            vec![
                vec![1.0, 1.0, 0.0],
                vec![0.0, 1.0, 1.0],
                vec![2.0, 2.0, 0.0],
            ],
        ).unwrap();

        let recommender = ContentRecommender::new(features, Similarity::Cosine);

        assert_eq!(recommender.similar_items("doc1", 1).unwrap(), vec!["doc3"]);
        assert_eq!(
            recommender.similar_items_with("doc2", 2, Similarity::SharedFeatureSum).unwrap(),
            vec!["doc3", "doc1"]);
        assert_eq!(
            recommender.similar_items_with("doc3", 5, Similarity::DotProduct).unwrap(),
            vec!["doc1", "doc2"]);
    }
}
