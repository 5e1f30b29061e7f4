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

use fnv::FnvHashSet;

use crate::types::RankedList;

/// Merges two ranked lists into one. Scores of different lists are not comparable (think
/// mean ratings in a context vs. a user's own ratings), so every identifier is represented
/// by its position in its own list. Identifiers are then ordered by position, equal
/// positions favour the first list, and only the first occurrence of an identifier is kept.
pub fn combine<S: AsRef<str>>(first: &[S], second: &[S], n: usize) -> RankedList {
    combine_all(&[first, second], n)
}

/// Same as `combine` for any number of lists, earlier lists win ties.
pub fn combine_all<S: AsRef<str>>(lists: &[&[S]], n: usize) -> RankedList {

    let mut entries: Vec<(usize, &str)> = lists.iter()
        .flat_map(|list| {
            list.iter().enumerate().map(|(position, id)| (position, id.as_ref()))
        })
        .collect();

    // Stable, so entries of earlier lists stay in front on equal positions
    entries.sort_by_key(|&(position, _)| position);

    let mut seen: FnvHashSet<&str> =
        FnvHashSet::with_capacity_and_hasher(entries.len(), Default::default());

    entries.into_iter()
        .filter(|&(_, id)| seen.insert(id))
        .take(n)
        .map(|(_, id)| id.to_owned())
        .collect()
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn merges_by_rank_position() {
        let context_list = ["x", "y", "z"];
        let user_list = ["y", "w"];

        assert_eq!(combine(&context_list, &user_list, 3), vec!["x", "y", "w"]);
        assert_eq!(combine(&context_list, &user_list, 10), vec!["x", "y", "w", "z"]);
    }

    #[test]
    fn first_list_wins_ties() {
        assert_eq!(combine(&["a", "b"], &["c", "d"], 4), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn duplicates_and_empty_lists() {
        let empty: [&str; 0] = [];

        assert_eq!(combine(&["a", "a", "b"], &empty, 5), vec!["a", "b"]);
        assert_eq!(combine(&empty, &["q"], 5), vec!["q"]);
        assert!(combine(&["a"], &["b"], 0).is_empty());
    }

    #[test]
    fn more_than_two_lists() {
        let lists: [&[&str]; 3] = [&["a", "b"], &["b", "c"], &["d"]];

        assert_eq!(combine_all(&lists, 10), vec!["a", "b", "d", "c"]);
    }
}
