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

#[cfg(test)]
mod tests {

    use crate::batch;
    use crate::config::EngineConfig;
    use crate::engine::{Recommender, Strategy};
    use crate::hybrid;
    use crate::matrix::MatrixBuilder;
    use crate::rank;
    use crate::similarity::{self, Similarity};
    use crate::types::{self, Axis, Observation};

    #[test]
    fn programmatic_usage() {

        /* Our input data comprises of observed ratings of items by users. The identifiers
           used can be strings of arbitrary length and structure, a rating may carry the
           context it was given in. */
        let observations = vec![
            Observation::new("alice", "apple", 5.0).with_context("home"),
            Observation::new("alice", "dog", 3.0).with_context("park"),
            Observation::new("alice", "pony", 4.0).with_context("park"),
            Observation::new("bob", "apple", 4.0).with_context("home"),
            Observation::new("bob", "pony", 5.0).with_context("park"),
            Observation::new("charles", "pony", 2.0).with_context("park"),
            Observation::new("charles", "bike", 5.0).with_context("park"),
        ];

        /* The recommender builds the ratings matrix once. Afterwards it only reads it, so a
           single instance can answer any number of queries. */
        let recommender = Recommender::new(observations, EngineConfig::default()).unwrap();

        /* Users which rated like alice did, and the items they liked which alice has not
           seen yet. */
        let similar_users = recommender.similar_users("alice", 2).unwrap();
        assert_eq!(similar_users, vec!["bob", "charles"]);

        let for_alice = recommender.user_based("alice", 10).unwrap();
        assert_eq!(for_alice, vec!["bike"]);

        /* Items which were rated by the same users as apple. */
        let like_apple = recommender.item_based("apple", 2).unwrap();
        assert_eq!(like_apple, vec!["pony", "dog"]);

        /* The best rated items in the park, and a mix of those with bob's own favourites. */
        let in_the_park = recommender.context_based("park", 3).unwrap();
        assert_eq!(in_the_park, vec!["bike", "pony", "dog"]);

        let for_bob_in_the_park = recommender.hybrid("bob", "park", 3).unwrap();
        assert_eq!(for_bob_in_the_park, vec!["bike", "pony", "apple"]);

        /* All users at once, spread over two threads. */
        let users = recommender.query_keys(&Strategy::UserBased).unwrap();
        let everyone = batch::recommend_all(&users, 2, |user| recommender.user_based(user, 10));
        assert_eq!(everyone.len(), 3);
    }

    #[test]
    fn building_blocks() {

        /* The same steps, taken one by one: build the matrix, score, rank, merge. */
        let observations = vec![
            Observation::new("u1", "i1", 5.0),
            Observation::new("u1", "i2", 3.0),
            Observation::new("u2", "i1", 4.0),
            Observation::new("u2", "i2", 4.0),
            Observation::new("u2", "i3", 1.0),
            Observation::new("u3", "i2", 2.0),
            Observation::new("u3", "i3", 5.0),
        ];

        let ratings = MatrixBuilder::default().build_dense(&observations).unwrap();
        let u1 = ratings.row_index().position("u1").unwrap();

        let scores = similarity::scores(ratings.matrix(), Axis::Rows, u1, Similarity::Cosine)
            .unwrap();

        let mut exclude = types::new_index_set(1);
        exclude.insert(u1);

        let neighbors = rank::rank_keys(ratings.row_index(), &scores, &exclude, 10).unwrap();
        assert_eq!(neighbors, vec!["u2", "u3"]);

        let merged = hybrid::combine(&["x", "y", "z"], &["y", "w"], 3);
        assert_eq!(merged, vec!["x", "y", "w"]);
    }
}
