//! Session lifecycle state and the `GameStatus` DTO.

use serde::{Deserialize, Serialize};

use crate::config_model::{GameMode, ServerRegion, SteamId};

/// Lifecycle state. `Error` carries the surfaced failure message — the
/// session's `error` field is the single surfaced failure channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Creating,
    Waiting,
    Launching,
    InProgress,
    Postgame,
    Completed,
    Error { message: String },
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Creating => "creating",
            SessionState::Waiting => "waiting",
            SessionState::Launching => "launching",
            SessionState::InProgress => "in_progress",
            SessionState::Postgame => "postgame",
            SessionState::Completed => "completed",
            SessionState::Error { .. } => "error",
        }
    }

    /// State never moves backwards out of postgame, completed, or error.
    pub fn is_terminal_or_postgame(&self) -> bool {
        matches!(
            self,
            SessionState::Postgame | SessionState::Completed | SessionState::Error { .. }
        )
    }

    /// Whether moving from `self` to `new` respects the same invariant:
    /// once postgame, completed, or error, the only legal moves are the
    /// forward ones into completed or error.
    pub fn allows_transition_to(&self, new: &SessionState) -> bool {
        if !self.is_terminal_or_postgame() {
            return true;
        }
        matches!(new, SessionState::Completed | SessionState::Error { .. })
    }
}

/// Status snapshot returned by `GET /game/{id}` and `GET /games`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameStatus {
    pub game_id: String,
    pub state: String,
    pub lobby_id: u64,
    pub game_mode: GameMode,
    pub server_region: ServerRegion,
    pub allow_cheats: bool,
    pub radiant_count: usize,
    pub dire_count: usize,
    pub radiant_team: Vec<SteamId>,
    pub dire_team: Vec<SteamId>,
    pub polling_active: bool,
    pub polling_done: bool,
    pub pass_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
