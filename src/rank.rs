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
use std::collections::BinaryHeap;

use crate::error::{Error, Result};
use crate::stats::KeyIndex;
use crate::types::{IndexSet, RankedList};

/// Result type used to find the top-n candidates via a binary heap
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct ScoredItem {
    pub item: usize,
    pub score: f64,
}

/// Ordering for our max-heap, the top of the heap is the worst candidate seen so far. Note
/// that we must use a special implementation here as there is no total order on floating
/// point numbers. Equal scores are ordered by position, earlier positions rank higher.
fn cmp_reverse(scored_item_a: &ScoredItem, scored_item_b: &ScoredItem) -> Ordering {
    match scored_item_a.score.partial_cmp(&scored_item_b.score) {
        Some(Ordering::Less) => Ordering::Greater,
        Some(Ordering::Greater) => Ordering::Less,
        _ => scored_item_a.item.cmp(&scored_item_b.item),
    }
}

impl Eq for ScoredItem {}

impl Ord for ScoredItem {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_reverse(self, other)
    }
}

impl PartialOrd for ScoredItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(cmp_reverse(self, other))
    }
}

/// Positions of the `n` highest scores, best first. Excluded positions and NaN scores
/// (no score) never show up, the result is shorter than `n` if fewer candidates remain.
/// Ties keep the order of the score vector.
pub fn rank(scores: &[f64], exclude: &IndexSet, n: usize) -> Result<Vec<usize>> {

    if scores.is_empty() {
        return Err(Error::EmptyScore);
    }

    if n == 0 {
        return Ok(Vec::new());
    }

    let mut heap = BinaryHeap::with_capacity(n.min(scores.len()));

    for (item, score) in scores.iter().enumerate() {

        if score.is_nan() || exclude.contains(&item) {
            continue;
        }

        let scored_item = ScoredItem { item, score: *score };

        if heap.len() < n {
            heap.push(scored_item);
        } else if let Some(mut top) = heap.peek_mut() {
            if scored_item < *top {
                *top = scored_item;
            }
        }
    }

    Ok(heap.into_sorted_vec()
        .into_iter()
        .map(|scored_item| scored_item.item)
        .collect())
}

/// Like `rank`, but returns the identifiers of the selected positions.
pub fn rank_keys(index: &KeyIndex, scores: &[f64], exclude: &IndexSet, n: usize)
    -> Result<RankedList> {

    rank(scores, exclude, n)?
        .into_iter()
        .map(|position| index.key(position).map(|key| key.to_owned()))
        .collect()
}

/// Ranks (identifier, score) pairs, dropping the identifiers in `exclude`.
pub fn rank_scored(scored: &[(String, f64)], exclude: &[&str], n: usize) -> Result<RankedList> {

    let scores: Vec<f64> = scored.iter().map(|&(_, score)| score).collect();

    let excluded_positions: IndexSet = scored.iter()
        .enumerate()
        .filter(|(_, (key, _))| exclude.contains(&key.as_str()))
        .map(|(position, _)| position)
        .collect();

    Ok(rank(&scores, &excluded_positions, n)?
        .into_iter()
        .map(|position| scored[position].0.clone())
        .collect())
}

#[cfg(test)]
mod tests {

    use proptest::prelude::*;

    use super::*;
    use crate::stats::KeyOrder;
    use crate::types;

    #[test]
    fn scored_item_ordering_reversed() {
        let item_a = ScoredItem { item: 1, score: 0.5 };
        let item_b = ScoredItem { item: 2, score: 1.5 };
        let item_c = ScoredItem { item: 3, score: 0.3 };
        let item_d = ScoredItem { item: 4, score: 0.5 };

        assert!(item_a > item_b);
        assert!(item_a < item_c);
        assert!(item_b < item_c);
        assert!(item_a < item_d);
    }

    #[test]
    fn ties_keep_input_order() {
        let index = KeyIndex::from_keys(vec!["a", "b", "c"], KeyOrder::FirstSeen);

        let ranked = rank_keys(&index, &[5.0, 5.0, 3.0], &types::new_index_set(0), 2).unwrap();

        assert_eq!(ranked, vec!["a", "b"]);
    }

    #[test]
    fn topn() {
        let scores = [0.5, 1.5, 0.3, 3.5, 2.5];

        let top = rank(&scores, &types::new_index_set(0), 3).unwrap();

        assert_eq!(top, vec![3, 4, 1]);
    }

    #[test]
    fn excluded_positions_are_skipped_without_backfill_beyond_candidates() {
        let scores = [4.0, 3.0, 2.0];
        let exclude: IndexSet = vec![0, 2].into_iter().collect();

        assert_eq!(rank(&scores, &exclude, 3).unwrap(), vec![1]);
    }

    #[test]
    fn undefined_scores_are_never_ranked() {
        let scores = [f64::NAN, 1.0, f64::NAN, 2.0];

        assert_eq!(rank(&scores, &types::new_index_set(0), 10).unwrap(), vec![3, 1]);
    }

    #[test]
    fn zero_and_empty() {
        assert!(rank(&[1.0, 2.0], &types::new_index_set(0), 0).unwrap().is_empty());
        assert!(matches!(rank(&[], &types::new_index_set(0), 3), Err(Error::EmptyScore)));
    }

    #[test]
    fn unbounded_n_returns_every_candidate() {
        assert_eq!(rank(&[1.0, 2.0], &types::new_index_set(0), usize::MAX).unwrap(), vec![1, 0]);
    }

    #[test]
    fn scored_pairs() {
        let scored = vec![
            ("tent".to_owned(), 5.0),
            ("bike".to_owned(), 4.5),
            ("kite".to_owned(), 4.5),
        ];

        assert_eq!(rank_scored(&scored, &["tent"], 5).unwrap(), vec!["bike", "kite"]);
    }

    proptest! {
        #[test]
        fn rank_matches_stable_sort(
            scores in proptest::collection::vec(-3i8..3, 1..50),
            excluded in proptest::collection::vec(0usize..50, 0..10),
            n in 0usize..20,
        ) {
            let scores: Vec<f64> = scores.into_iter().map(f64::from).collect();
            let exclude: IndexSet = excluded.into_iter().collect();

            let ranked = rank(&scores, &exclude, n).unwrap();

            let mut expected: Vec<usize> = (0..scores.len())
                .filter(|position| !exclude.contains(position))
                .collect();
            expected.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap());
            expected.truncate(n);

            prop_assert!(ranked.len() <= n);
            prop_assert!(ranked.iter().all(|position| !exclude.contains(position)));
            prop_assert_eq!(ranked, expected);
        }
    }
}
