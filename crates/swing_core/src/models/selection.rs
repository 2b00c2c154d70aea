use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::pitch::PitchRecord;

/// Ball/strike counts the dashboard lets the viewer pick.
///
/// Other counts exist in the source data but are never selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CountChoice {
    #[default]
    #[serde(rename = "0-0")]
    ZeroZero,
    #[serde(rename = "0-2")]
    ZeroTwo,
}

impl CountChoice {
    pub const ALL: [CountChoice; 2] = [CountChoice::ZeroZero, CountChoice::ZeroTwo];

    pub fn balls(&self) -> u32 {
        0
    }

    pub fn strikes(&self) -> u32 {
        match self {
            CountChoice::ZeroZero => 0,
            CountChoice::ZeroTwo => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CountChoice::ZeroZero => "0-0",
            CountChoice::ZeroTwo => "0-2",
        }
    }

    pub fn matches(&self, record: &PitchRecord) -> bool {
        record.is_count(self.balls(), self.strikes())
    }
}

impl fmt::Display for CountChoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CountChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0-0" => Ok(CountChoice::ZeroZero),
            "0-2" => Ok(CountChoice::ZeroTwo),
            other => Err(format!("Unsupported count '{other}' (expected 0-0 or 0-2)")),
        }
    }
}

/// What the viewer has currently committed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionState {
    /// Free-typed player name, possibly unknown
    pub player_query: String,
    pub count: CountChoice,
}

impl SelectionState {
    pub fn new(player_query: impl Into<String>, count: CountChoice) -> Self {
        Self {
            player_query: player_query.into(),
            count,
        }
    }

    /// Query as compared against the player index.
    pub fn trimmed_query(&self) -> &str {
        self.player_query.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection_is_zero_zero() {
        let selection = SelectionState::default();
        assert_eq!(selection.count, CountChoice::ZeroZero);
        assert!(selection.player_query.is_empty());
    }

    #[test]
    fn test_count_parsing() {
        assert_eq!("0-2".parse::<CountChoice>(), Ok(CountChoice::ZeroTwo));
        assert_eq!(" 0-0 ".parse::<CountChoice>(), Ok(CountChoice::ZeroZero));
        assert!("3-2".parse::<CountChoice>().is_err());
    }

    #[test]
    fn test_count_matches_only_exact_pair() {
        let zero_two = PitchRecord::new("A", 0, 2);
        let one_two = PitchRecord::new("A", 1, 2);
        assert!(CountChoice::ZeroTwo.matches(&zero_two));
        assert!(!CountChoice::ZeroTwo.matches(&one_two));
        assert!(!CountChoice::ZeroZero.matches(&zero_two));
    }

    #[test]
    fn test_count_serde_uses_labels() {
        let json = serde_json::to_string(&CountChoice::ZeroTwo).unwrap();
        assert_eq!(json, "\"0-2\"");
    }
}
