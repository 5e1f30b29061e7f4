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

use fnv::{FnvHashMap, FnvHashSet};

use crate::aggregate;
use crate::error::{Error, Result};
use crate::rank;
use crate::stats::{KeyIndex, KeyOrder};
use crate::types::{Observation, RankedList};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub age: u32,
    pub gender: String,
    pub favourites: Vec<String>,
}

/// User profiles, iterated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Demographics {
    users: Vec<String>,
    profiles: FnvHashMap<String, Profile>,
}

impl Demographics {

    pub fn new() -> Self {
        Demographics::default()
    }

    /// Adds or replaces the profile of `user`.
    pub fn insert<S: Into<String>>(&mut self, user: S, profile: Profile) {
        let user = user.into();
        if !self.profiles.contains_key(&user) {
            self.users.push(user.clone());
        }
        self.profiles.insert(user, profile);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn profile(&self, user: &str) -> Result<&Profile> {
        self.profiles.get(user).ok_or_else(|| Error::missing_key(user))
    }

    /// Users with the same age and gender as `user`, including `user`.
    pub fn peers(&self, user: &str) -> Result<Vec<&str>> {
        let profile = self.profile(user)?;

        Ok(self.users.iter()
            .filter(|other| {
                let other_profile = &self.profiles[other.as_str()];
                other_profile.age == profile.age && other_profile.gender == profile.gender
            })
            .map(|other| other.as_str())
            .collect())
    }
}

/// Items with the highest mean rating among users of the same age and gender as `user`,
/// leaving out the items `user` rated already.
pub fn mean_rating(
    observations: &[Observation],
    demographics: &Demographics,
    user: &str,
    n: usize,
    order: KeyOrder,
) -> Result<RankedList> {

    let peers: FnvHashSet<&str> = demographics.peers(user)?.into_iter().collect();

    let means = aggregate::group_mean(
        observations.iter().filter(|observation| peers.contains(observation.row.as_str())),
        order);

    let rated: Vec<&str> = observations.iter()
        .filter(|observation| observation.row == user)
        .map(|observation| observation.column.as_str())
        .collect();

    rank::rank_scored(&means, &rated, n)
}

/// Items most often named as favourite by users of the same age and gender as `user`, ties
/// in order of first mention. The favourites of `user` are left out.
pub fn favourites(demographics: &Demographics, user: &str, n: usize) -> Result<RankedList> {

    let peers = demographics.peers(user)?;

    let mut mentions: Vec<&str> = Vec::new();
    for peer in peers.iter() {
        mentions.extend(demographics.profile(peer)?.favourites.iter().map(|item| item.as_str()));
    }

    let items = KeyIndex::from_keys(mentions.iter().cloned(), KeyOrder::FirstSeen);
    let mut counts = vec![0.0; items.len()];
    for item in mentions.iter() {
        counts[items.position(item)?] += 1.0;
    }

    let scored: Vec<(String, f64)> = items.keys().iter().cloned().zip(counts).collect();

    let own: Vec<&str> = demographics.profile(user)?
        .favourites
        .iter()
        .map(|item| item.as_str())
        .collect();

    rank::rank_scored(&scored, &own, n)
}
