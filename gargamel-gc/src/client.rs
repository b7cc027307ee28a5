//! The Game Coordinator capability trait: everything a protocol driver needs
//! from the underlying Steam-client and Dota-protocol libraries, fronted as
//! one async trait so the backend can be swapped.

use async_trait::async_trait;
use gargamel_shared::SteamId;

use crate::details::LobbyDetails;

/// Everything the protocol driver needs from the underlying Steam-client and
/// Dota-protocol libraries. A production build backs this with those
/// libraries; tests back it with [`crate::FakeGcClient`].
#[async_trait]
pub trait GcClient: Send + Sync {
    async fn connect(&self) -> anyhow::Result<()>;
    async fn log_on(&self, username: &str, password: &str) -> anyhow::Result<()>;
    async fn set_persona_state_online(&self) -> anyhow::Result<()>;
    /// `SetGamesPlayed`; Dota 2's Steam app id is 570.
    async fn set_games_played(&self, app_id: u32) -> anyhow::Result<()>;
    async fn set_playing(&self, playing: bool) -> anyhow::Result<()>;
    async fn say_hello(&self) -> anyhow::Result<()>;
    async fn create_lobby(&self, details: &LobbyDetails) -> anyhow::Result<()>;
    async fn set_lobby_details(&self, details: &LobbyDetails) -> anyhow::Result<()>;
    async fn launch_lobby(&self) -> anyhow::Result<()>;
    async fn invite_lobby_member(&self, steam_id: SteamId) -> anyhow::Result<()>;
    /// `account_id32`: the low 32 bits of a 64-bit Steam id.
    async fn kick_lobby_member_from_team(&self, account_id32: u32) -> anyhow::Result<()>;
    async fn send_channel_message(&self, lobby_id: u64, text: &str) -> anyhow::Result<()>;
    async fn disconnect(&self) -> anyhow::Result<()>;
    /// The bot's own Steam id.
    fn steam_id(&self) -> SteamId;
}

/// Low 32 bits of a 64-bit Steam id, as `KickLobbyMemberFromTeam` expects.
pub fn account_id32(steam_id: SteamId) -> u32 {
    steam_id as u32
}

/// Builds a fresh [`GcClient`] plus its paired event stream for one game.
/// The real Steam-client/Dota-protocol libraries this trait fronts are an
/// external collaborator outside this workspace; a production deployment
/// supplies its own factory backed by that library. This workspace's binary
/// wires up [`crate::fake::FakeGcClientFactory`] so the full control surface
/// is exercisable end to end without it.
#[async_trait]
pub trait GcClientFactory: Send + Sync {
    async fn create(
        &self,
        game_id: &str,
    ) -> anyhow::Result<(
        std::sync::Arc<dyn GcClient>,
        tokio::sync::mpsc::UnboundedReceiver<crate::events::GcEvent>,
    )>;
}
