//! # Filter Resolver
//!
//! Turns the current selection into the rows every chart draws from.
//!
//! Precedence:
//! 1. `ExactPlayer` - the trimmed query is a known batter with rows at the count
//! 2. `LeagueAverage` - every row at the count, any batter
//! 3. `AllData` - the whole store
//!
//! For a non-empty store the result is never empty. An empty store resolves
//! to an empty `AllData` subset.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::data::RecordStore;
use crate::index::PlayerIndex;
use crate::models::{PitchRecord, SelectionState};

/// Which fallback level produced the active subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    ExactPlayer,
    LeagueAverage,
    AllData,
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ResolutionTier::ExactPlayer => "exact_player",
            ResolutionTier::LeagueAverage => "league_average",
            ResolutionTier::AllData => "all_data",
        };
        f.write_str(s)
    }
}

/// Active subset as row indices into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub indices: Vec<usize>,
    pub tier: ResolutionTier,
}

impl Resolution {
    /// Rows of this subset, in store order.
    pub fn rows<'s>(&'s self, store: &'s RecordStore) -> impl Iterator<Item = &'s PitchRecord> + 's {
        self.indices.iter().filter_map(move |&i| store.get(i))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Stateless resolver.
pub struct FilterResolver;

impl FilterResolver {
    pub fn resolve(
        store: &RecordStore,
        index: &PlayerIndex,
        selection: &SelectionState,
    ) -> Resolution {
        let count = selection.count;
        let player = selection.trimmed_query();

        // 1. Exact player at the selected count
        if !player.is_empty() && index.contains(player) {
            let indices = matching(store, |r| r.batter_name == player && count.matches(r));
            if !indices.is_empty() {
                return Self::resolved(indices, ResolutionTier::ExactPlayer, selection);
            }
        }

        // 2. League rows at the selected count
        let indices = matching(store, |r| count.matches(r));
        if !indices.is_empty() {
            return Self::resolved(indices, ResolutionTier::LeagueAverage, selection);
        }

        // 3. Everything
        Self::resolved((0..store.len()).collect(), ResolutionTier::AllData, selection)
    }

    fn resolved(indices: Vec<usize>, tier: ResolutionTier, selection: &SelectionState) -> Resolution {
        debug!(
            player = %selection.player_query,
            count = %selection.count,
            tier = %tier,
            rows = indices.len(),
            "Selection resolved"
        );
        Resolution { indices, tier }
    }
}

fn matching(store: &RecordStore, pred: impl Fn(&PitchRecord) -> bool) -> Vec<usize> {
    store
        .all()
        .iter()
        .enumerate()
        .filter(|(_, r)| pred(r))
        .map(|(i, _)| i)
        .collect()
}
