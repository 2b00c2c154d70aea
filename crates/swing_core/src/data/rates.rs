//! Per-count rate tables
//!
//! Pre-aggregated plate-discipline and batted-ball rates, one file per
//! strike state for players and one for the league:
//!
//! - `player_average_rates_0str.json` / `player_average_rates_2str.json`:
//!   array of `{ "name_with_stand": ..., "chase%": 0.21, ... }`
//! - `league_average_rates_0str.json` / `league_average_rates_2str.json`:
//!   a single object, or an array whose first element is used
//!
//! These are lookup tables only; nothing here is recomputed from pitch rows.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use super::names::canonical_batter_name;
use super::record_store::LoadOptions;
use crate::error::{LoadError, Result};
use crate::models::CountChoice;

pub const PLAYER_NAME_KEY: &str = "name_with_stand";
pub const LEAGUE_AVERAGE_LABEL: &str = "League Average";

/// Rate stats shown in the dashboard stats table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RateStat {
    Chase,
    Contact,
    Whiff,
    Oppo,
    GroundBall,
    Barrel,
}

impl RateStat {
    pub const ALL: [RateStat; 6] = [
        RateStat::Chase,
        RateStat::Contact,
        RateStat::Whiff,
        RateStat::Oppo,
        RateStat::GroundBall,
        RateStat::Barrel,
    ];

    /// JSON key, also used as the display label.
    pub fn key(&self) -> &'static str {
        match self {
            RateStat::Chase => "chase%",
            RateStat::Contact => "contact%",
            RateStat::Whiff => "whiff%",
            RateStat::Oppo => "oppo%",
            RateStat::GroundBall => "gb%",
            RateStat::Barrel => "barrel%",
        }
    }
}

/// One row of rates: a player's, or the league's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLine {
    pub label: String,
    pub is_league: bool,
    values: FxHashMap<RateStat, f64>,
}

impl RateLine {
    fn empty_league() -> Self {
        Self {
            label: LEAGUE_AVERAGE_LABEL.to_string(),
            is_league: true,
            values: FxHashMap::default(),
        }
    }

    fn from_object(
        label: String,
        is_league: bool,
        obj: &serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        let values = RateStat::ALL
            .into_iter()
            .filter_map(|stat| {
                let v = obj.get(stat.key())?;
                let n = v
                    .as_f64()
                    .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))?;
                n.is_finite().then_some((stat, n))
            })
            .collect();
        Self {
            label,
            is_league,
            values,
        }
    }

    /// Raw fraction (0.0 - 1.0), if the source had one.
    pub fn value(&self, stat: RateStat) -> Option<f64> {
        self.values.get(&stat).copied()
    }

    /// Percentage with one decimal ("21.4%"), or "-" when missing.
    pub fn formatted(&self, stat: RateStat) -> String {
        match self.value(stat) {
            Some(v) => format!("{:.1}%", v * 100.0),
            None => "-".to_string(),
        }
    }
}

/// Player and league rate lookups, keyed by count.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    players: FxHashMap<CountChoice, FxHashMap<String, RateLine>>,
    league: FxHashMap<CountChoice, RateLine>,
}

impl RateTable {
    pub fn player_file_name(count: CountChoice) -> String {
        format!("player_average_rates_{}str.json", count.strikes())
    }

    pub fn league_file_name(count: CountChoice) -> String {
        format!("league_average_rates_{}str.json", count.strikes())
    }

    /// Load the four rate files from `dir`.
    pub fn load_dir(dir: &Path, options: &LoadOptions) -> Result<Self> {
        let mut table = Self::default();
        for count in CountChoice::ALL {
            let player_json = std::fs::read_to_string(dir.join(Self::player_file_name(count)))?;
            let league_json = std::fs::read_to_string(dir.join(Self::league_file_name(count)))?;
            table.insert_count(count, &player_json, &league_json, options)?;
        }
        Ok(table)
    }

    /// Add the player and league tables for one count.
    pub fn insert_count(
        &mut self,
        count: CountChoice,
        player_json: &str,
        league_json: &str,
        options: &LoadOptions,
    ) -> Result<()> {
        let players: serde_json::Value = serde_json::from_str(player_json)?;
        let rows = players.as_array().ok_or_else(|| {
            LoadError::Malformed(format!("player rates for {count}: expected a JSON array"))
        })?;

        let mut by_name = FxHashMap::default();
        for row in rows {
            let Some(obj) = row.as_object() else {
                warn!(count = %count, "Player rate row is not an object, skipping");
                continue;
            };
            let Some(raw_name) = obj.get(PLAYER_NAME_KEY).and_then(|v| v.as_str()) else {
                warn!(count = %count, "Player rate row has no {}, skipping", PLAYER_NAME_KEY);
                continue;
            };
            let name = canonical_batter_name(raw_name, options.strip_hand_marker);
            if name.is_empty() {
                continue;
            }
            // First row wins when canonicalisation folds two stances together
            by_name
                .entry(name.clone())
                .or_insert_with(|| RateLine::from_object(name, false, obj));
        }

        let league: serde_json::Value = serde_json::from_str(league_json)?;
        let league_obj = match &league {
            serde_json::Value::Array(items) => items.first().and_then(|v| v.as_object()),
            serde_json::Value::Object(obj) => Some(obj),
            _ => None,
        }
        .ok_or_else(|| {
            LoadError::Malformed(format!("league rates for {count}: expected an object"))
        })?;

        debug!(count = %count, players = by_name.len(), "Rate table loaded");
        self.players.insert(count, by_name);
        self.league.insert(
            count,
            RateLine::from_object(LEAGUE_AVERAGE_LABEL.to_string(), true, league_obj),
        );
        Ok(())
    }

    /// Player's rates at `count`, falling back to the league line.
    pub fn lookup(&self, count: CountChoice, player: &str) -> RateLine {
        let name = player.trim();
        if !name.is_empty() {
            if let Some(line) = self.players.get(&count).and_then(|m| m.get(name)) {
                return line.clone();
            }
        }
        self.league
            .get(&count)
            .cloned()
            .unwrap_or_else(RateLine::empty_league)
    }

    pub fn player_count(&self, count: CountChoice) -> usize {
        self.players.get(&count).map_or(0, |m| m.len())
    }
}
