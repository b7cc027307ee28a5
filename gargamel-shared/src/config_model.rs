//! Game identity and configuration: the immutable-identity, mutable-settings
//! half of the data model.

use serde::{Deserialize, Serialize};

/// 64-bit Steam identifier.
pub type SteamId = u64;

/// Server region, as accepted by `CreateLobby`/`SetLobbyDetails`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum ServerRegion {
    UsWest,
    UsEast,
    EuWest,
    EuEast,
    China,
    Sea,
}

impl ServerRegion {
    pub const DEFAULT: ServerRegion = ServerRegion::UsEast;

    pub fn as_i32(self) -> i32 {
        match self {
            ServerRegion::UsWest => 1,
            ServerRegion::UsEast => 2,
            ServerRegion::EuWest => 3,
            ServerRegion::EuEast => 4,
            ServerRegion::China => 5,
            ServerRegion::Sea => 6,
        }
    }
}

impl Default for ServerRegion {
    fn default() -> Self {
        ServerRegion::DEFAULT
    }
}

impl TryFrom<i32> for ServerRegion {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ServerRegion::UsWest),
            2 => Ok(ServerRegion::UsEast),
            3 => Ok(ServerRegion::EuWest),
            4 => Ok(ServerRegion::EuEast),
            5 => Ok(ServerRegion::China),
            6 => Ok(ServerRegion::Sea),
            other => Err(format!("unknown server_region {other}")),
        }
    }
}

impl From<ServerRegion> for i32 {
    fn from(value: ServerRegion) -> Self {
        value.as_i32()
    }
}

/// Game mode, as accepted by `CreateLobby`/`SetLobbyDetails`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum GameMode {
    None,
    CaptainsMode,
    RandomDraft,
    SingleDraft,
    AllRandom,
    ReverseCaptainsMode,
    Mid1v1,
    LeastPlayed,
    CaptainsDraft,
    AbilityDraft,
    AllRandomDeathmatch,
    RankedAllPick,
    Turbo,
}

impl GameMode {
    pub const DEFAULT: GameMode = GameMode::RankedAllPick;

    pub fn as_i32(self) -> i32 {
        match self {
            GameMode::None => 0,
            GameMode::CaptainsMode => 2,
            GameMode::RandomDraft => 3,
            GameMode::SingleDraft => 4,
            GameMode::AllRandom => 5,
            GameMode::ReverseCaptainsMode => 8,
            GameMode::Mid1v1 => 11,
            GameMode::LeastPlayed => 12,
            GameMode::CaptainsDraft => 16,
            GameMode::AbilityDraft => 18,
            GameMode::AllRandomDeathmatch => 20,
            GameMode::RankedAllPick => 22,
            GameMode::Turbo => 23,
        }
    }
}

impl Default for GameMode {
    fn default() -> Self {
        GameMode::DEFAULT
    }
}

impl TryFrom<i32> for GameMode {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GameMode::None),
            2 => Ok(GameMode::CaptainsMode),
            3 => Ok(GameMode::RandomDraft),
            4 => Ok(GameMode::SingleDraft),
            5 => Ok(GameMode::AllRandom),
            8 => Ok(GameMode::ReverseCaptainsMode),
            11 => Ok(GameMode::Mid1v1),
            12 => Ok(GameMode::LeastPlayed),
            16 => Ok(GameMode::CaptainsDraft),
            18 => Ok(GameMode::AbilityDraft),
            20 => Ok(GameMode::AllRandomDeathmatch),
            22 => Ok(GameMode::RankedAllPick),
            23 => Ok(GameMode::Turbo),
            other => Err(format!("unknown game_mode {other}")),
        }
    }
}

impl From<GameMode> for i32 {
    fn from(value: GameMode) -> Self {
        value.as_i32()
    }
}

/// Credentials for the underlying Steam-client login.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Immutable identity plus mutable settings for one managed lobby.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    pub game_id: String,
    pub credentials: Credentials,
    pub radiant_roster: Vec<SteamId>,
    pub dire_roster: Vec<SteamId>,
    pub result_callback_url: String,
    #[serde(default)]
    pub poll_callback_url: Option<String>,
    #[serde(default)]
    pub server_region: ServerRegion,
    #[serde(default)]
    pub game_mode: GameMode,
    #[serde(default)]
    pub allow_cheats: bool,
    pub game_name: String,
    #[serde(default)]
    pub pass_key: String,
    #[serde(default)]
    pub debug_steam_id: Option<SteamId>,
}

impl GameConfig {
    /// Default game name: `gargamel_game_<id>`.
    pub fn default_game_name(game_id: &str) -> String {
        format!("gargamel_game_{game_id}")
    }

    /// Auto-poll threshold: 2 players in debug mode, 7 otherwise.
    pub fn auto_poll_threshold(&self) -> usize {
        if self.debug_steam_id.filter(|id| *id != 0).is_some() {
            2
        } else {
            7
        }
    }
}
