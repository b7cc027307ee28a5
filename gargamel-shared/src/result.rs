//! Match outcome accumulator.

use serde::{Deserialize, Serialize};

use crate::config_model::{GameMode, ServerRegion};

/// Post-game outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum MatchOutcome {
    Unknown,
    RadiantWin,
    DireWin,
}

impl MatchOutcome {
    pub fn as_i32(self) -> i32 {
        match self {
            MatchOutcome::Unknown => 0,
            MatchOutcome::RadiantWin => 2,
            MatchOutcome::DireWin => 3,
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, MatchOutcome::Unknown)
    }
}

impl Default for MatchOutcome {
    fn default() -> Self {
        MatchOutcome::Unknown
    }
}

impl TryFrom<i32> for MatchOutcome {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MatchOutcome::Unknown),
            2 => Ok(MatchOutcome::RadiantWin),
            3 => Ok(MatchOutcome::DireWin),
            other => Err(format!("unknown match outcome {other}")),
        }
    }
}

impl From<MatchOutcome> for i32 {
    fn from(value: MatchOutcome) -> Self {
        value.as_i32()
    }
}

/// Accumulator-to-finalized match result. A result is *complete* once
/// `match_id != 0` and `outcome` is known; only complete results are
/// reported and cause teardown.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GameResult {
    pub game_id: String,
    #[serde(default)]
    pub lobby_id: u64,
    #[serde(default)]
    pub match_id: u64,
    #[serde(default)]
    pub outcome: MatchOutcome,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub radiant_score: u32,
    #[serde(default)]
    pub dire_score: u32,
    #[serde(default)]
    pub start_time: u32,
    #[serde(default)]
    pub lobby_type: i32,
    #[serde(default)]
    pub game_mode: Option<GameMode>,
    #[serde(default)]
    pub server_region: Option<ServerRegion>,
    /// Wallclock completion timestamp (Unix seconds), stamped by the caller
    /// after the result is assembled (no `SystemTime::now()` inside pure
    /// accumulation logic, so it stays trivially testable).
    #[serde(default)]
    pub completed_at: u64,
}

impl GameResult {
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            ..Default::default()
        }
    }

    /// A result is complete once both a match id and a known outcome are present.
    pub fn is_complete(&self) -> bool {
        self.match_id != 0 && self.outcome.is_known()
    }

    /// The key under which this result accumulates in `pendingResults`:
    /// the match id if known, else the lobby id.
    pub fn pending_key(&self) -> u64 {
        if self.match_id != 0 {
            self.match_id
        } else {
            self.lobby_id
        }
    }
}
