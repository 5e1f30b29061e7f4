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

use std::sync::Mutex;
use std::time::Instant;

use scoped_pool::Pool;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::RankedList;
use crate::utils;

/// Answers every query with `recommend`, spread over `pool_size` threads. The engine behind
/// `recommend` is only read, so queries need no coordination besides collecting results.
/// Results are returned in query order.
pub fn recommend_all<F>(
    queries: &[String],
    pool_size: usize,
    recommend: F,
) -> Vec<(String, Result<RankedList>)>
    where F: Fn(&str) -> Result<RankedList> + Sync {

    let pool = Pool::new(pool_size.max(1));

    let results: Vec<Mutex<Option<Result<RankedList>>>> =
        queries.iter().map(|_| Mutex::new(None)).collect();

    let batch_start = Instant::now();

    pool.scoped(|scope| {
        for (query, slot) in queries.iter().zip(results.iter()) {

            let recommend = &recommend;

            scope.execute(move || {
                let result = recommend(query);
                if let Err(ref error) = result {
                    debug!(query = query.as_str(), %error, "query failed");
                }

                let mut slot = match slot.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                *slot = Some(result);
            });
        }
    });

    pool.shutdown();

    let results: Vec<(String, Result<RankedList>)> = queries.iter()
        .zip(results)
        .map(|(query, slot)| {
            let result = slot.into_inner()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .unwrap_or_else(|| {
                    Err(Error::InvalidArgument(format!("query {} was not processed", query)))
                });
            (query.clone(), result)
        })
        .collect();

    let num_failed = results.iter().filter(|(_, result)| result.is_err()).count();

    info!(
        queries = queries.len(),
        failed = num_failed,
        threads = pool_size.max(1),
        millis = utils::to_millis(batch_start.elapsed()),
        "batch recommendation finished"
    );

    results
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::Recommender;
    use crate::fixtures;

    #[test]
    fn parallel_results_match_sequential_ones() {
        let recommender =
            Recommender::new(fixtures::scenario_observations(), EngineConfig::default()).unwrap();

        let mut users = recommender.ratings().row_index().keys().to_vec();
        users.push("nobody".to_owned());

        let results = recommend_all(&users, 3, |user| recommender.user_based(user, 5));

        assert_eq!(results.len(), 4);

        for (user, result) in results.iter().take(3) {
            assert_eq!(result.as_ref().unwrap(), &recommender.user_based(user, 5).unwrap());
        }

        assert_eq!(results[3].0, "nobody");
        assert!(matches!(results[3].1, Err(Error::MissingKey(_))));
    }

    #[test]
    fn empty_batches() {
        let results = recommend_all(&[], 2, |_| Ok(Vec::new()));
        assert!(results.is_empty());
    }
}
