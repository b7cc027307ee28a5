//! HTTP request/response bodies for the control surface.

use serde::{Deserialize, Serialize};

use crate::config_model::{GameMode, ServerRegion, SteamId};

/// `POST /game` body.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateGameRequest {
    pub game_id: String,
    pub username: String,
    pub password: String,
    pub radiant_team: Vec<SteamId>,
    pub dire_team: Vec<SteamId>,
    pub result_url: String,
    #[serde(default)]
    pub server_region: Option<ServerRegion>,
    #[serde(default)]
    pub game_mode: Option<GameMode>,
    #[serde(default)]
    pub allow_cheats: Option<bool>,
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(default)]
    pub pass_key: Option<String>,
    #[serde(default)]
    pub debug_steam_id: Option<SteamId>,
    #[serde(default)]
    pub poll_callback_url: Option<String>,
}

/// `POST /game` response.
#[derive(Clone, Debug, Serialize)]
pub struct CreateGameResponse {
    pub game_id: String,
    pub status: &'static str,
    pub password: String,
}

/// `PUT /game/{id}` body. Every field is "present or leave unchanged": an
/// absent field in the JSON body leaves the corresponding config field
/// untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateGameRequest {
    #[serde(default)]
    pub game_mode: Option<GameMode>,
    #[serde(default)]
    pub server_region: Option<ServerRegion>,
    #[serde(default)]
    pub allow_cheats: Option<bool>,
    #[serde(default)]
    pub game_name: Option<String>,
}

impl UpdateGameRequest {
    pub fn is_empty(&self) -> bool {
        self.game_mode.is_none()
            && self.server_region.is_none()
            && self.allow_cheats.is_none()
            && self.game_name.is_none()
    }
}

/// `POST /game/{id}/swap` body.
#[derive(Clone, Debug, Deserialize)]
pub struct SwapRequest {
    pub steam_id_1: SteamId,
    pub steam_id_2: SteamId,
}

/// `POST /game/{id}/replace` body.
#[derive(Clone, Debug, Deserialize)]
pub struct ReplaceRequest {
    pub old_steam_id: SteamId,
    pub new_steam_id: SteamId,
}

/// `POST /game/{id}/chat` body.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// `action` field of `POST /poll/{id}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollAction {
    Start,
    End,
}

/// `POST /poll/{id}` body.
#[derive(Clone, Debug, Deserialize)]
pub struct PollRequest {
    pub action: PollAction,
    #[serde(default)]
    pub game_mode: Option<GameMode>,
}

/// Generic `{"status": "..."}` response used by most mutation endpoints.
#[derive(Clone, Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn new(status: &'static str) -> Self {
        Self { status }
    }
}

/// Outbound poll-start callback body.
#[derive(Clone, Debug, Serialize)]
pub struct PollStartCallback {
    pub game_id: String,
    pub action: &'static str,
}

impl PollStartCallback {
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            action: "start_poll",
        }
    }
}
