//! The `CreateLobby`/`SetLobbyDetails` parameter tuple.

use gargamel_shared::{GameConfig, GameMode, ServerRegion};
use serde::{Deserialize, Serialize};

/// Series configuration accepted by `CreateLobby`; opaque, preserved as-is.
pub const SERIES_TYPE_CUSTOM: i32 = 46;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmPick {
    Random,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseSetting {
    Limited,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPriorityRule {
    Manual,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
}

/// Full configured tuple dispatched via `CreateLobby` and re-dispatched (with
/// `allow_spectating` forced off) via `SetLobbyDetails` whenever
/// `setAllLobbySettings` fires. The GC overwrites on receipt; we never diff
/// this struct against the GC's view before sending it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LobbyDetails {
    pub game_name: String,
    pub pass_key: String,
    pub server_region: ServerRegion,
    pub game_mode: GameMode,
    pub allow_cheats: bool,
    pub cm_pick: CmPick,
    pub tv_delay_secs: u32,
    pub visibility: Visibility,
    pub pause_setting: PauseSetting,
    pub selection_priority: SelectionPriorityRule,
    pub series_type: i32,
    pub fill_with_bots: bool,
    pub allow_spectating: bool,
    pub all_chat: bool,
    pub lan: bool,
}

impl LobbyDetails {
    /// Parameters for the initial `CreateLobby` dispatch, as the last step
    /// of bootstrap. Crucially carries no lobby-id — the GC assigns one.
    pub fn for_create(cfg: &GameConfig) -> Self {
        Self {
            game_name: cfg.game_name.clone(),
            pass_key: cfg.pass_key.clone(),
            server_region: cfg.server_region,
            game_mode: cfg.game_mode,
            allow_cheats: cfg.allow_cheats,
            cm_pick: CmPick::Random,
            tv_delay_secs: 10,
            visibility: Visibility::Public,
            pause_setting: PauseSetting::Limited,
            selection_priority: SelectionPriorityRule::Manual,
            series_type: SERIES_TYPE_CUSTOM,
            fill_with_bots: false,
            allow_spectating: true,
            all_chat: true,
            lan: false,
        }
    }

    /// Parameters for `SetLobbyDetails` re-application (`setAllLobbySettings`).
    /// Same tuple, but `allow_spectating` is forced off — this asymmetry is
    /// intentional, not a bug.
    pub fn for_reapply(cfg: &GameConfig) -> Self {
        Self {
            allow_spectating: false,
            ..Self::for_create(cfg)
        }
    }
}
