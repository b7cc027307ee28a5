//! Channel-driven test double for [`crate::GcClient`], grounded on the
//! teacher's pattern of having more than one concrete `Transport` behind its
//! trait (`WebSocketTransport`/`IrohTransport`) — this is the third: a
//! fully in-process one for deterministic tests.

use std::sync::Arc;

use async_trait::async_trait;
use gargamel_shared::SteamId;
use tokio::sync::{mpsc, Mutex};

use std::sync::atomic::{AtomicU64, Ordering};

use crate::client::{GcClient, GcClientFactory};
use crate::details::LobbyDetails;
use crate::events::{ConnectionStatus, GcEvent};

/// One call made against a [`FakeGcClient`], recorded for test assertions.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedCall {
    Connect,
    LogOn { username: String, password: String },
    SetPersonaStateOnline,
    SetGamesPlayed(u32),
    SetPlaying(bool),
    SayHello,
    CreateLobby(LobbyDetails),
    SetLobbyDetails(LobbyDetails),
    LaunchLobby,
    InviteLobbyMember(SteamId),
    KickLobbyMemberFromTeam(u32),
    SendChannelMessage { lobby_id: u64, text: String },
    Disconnect,
}

/// In-process `GcClient`. Every call is recorded; events are driven by
/// whoever holds the paired [`mpsc::UnboundedSender`] returned by [`FakeGcClient::new`].
pub struct FakeGcClient {
    steam_id: SteamId,
    calls: Mutex<Vec<RecordedCall>>,
    events_tx: mpsc::UnboundedSender<GcEvent>,
}

impl FakeGcClient {
    /// Builds a fake client plus the event channel a test uses to push
    /// [`GcEvent`]s to whatever is driving it (normally the protocol
    /// driver's event loop). `connect`/`log_on` self-emit the events a real
    /// client would produce in response, so the ordinary bootstrap sequence
    /// runs without a test having to hand-drive it; everything else (lobby
    /// updates, match details, connection drops) is injected by the test
    /// through the returned sender.
    pub fn new(steam_id: SteamId) -> (Arc<Self>, mpsc::UnboundedSender<GcEvent>, mpsc::UnboundedReceiver<GcEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                steam_id,
                calls: Mutex::new(Vec::new()),
                events_tx: tx.clone(),
            }),
            tx,
            rx,
        )
    }

    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: RecordedCall) {
        self.calls.lock().await.push(call);
    }
}

#[async_trait]
impl GcClient for FakeGcClient {
    async fn connect(&self) -> anyhow::Result<()> {
        self.record(RecordedCall::Connect).await;
        let _ = self.events_tx.send(GcEvent::Connected);
        Ok(())
    }

    async fn log_on(&self, username: &str, password: &str) -> anyhow::Result<()> {
        self.record(RecordedCall::LogOn {
            username: username.to_string(),
            password: password.to_string(),
        })
        .await;
        let _ = self.events_tx.send(GcEvent::LoggedOn);
        let _ = self
            .events_tx
            .send(GcEvent::ConnectionStatusChanged(ConnectionStatus::HaveSession));
        Ok(())
    }

    async fn set_persona_state_online(&self) -> anyhow::Result<()> {
        self.record(RecordedCall::SetPersonaStateOnline).await;
        Ok(())
    }

    async fn set_games_played(&self, app_id: u32) -> anyhow::Result<()> {
        self.record(RecordedCall::SetGamesPlayed(app_id)).await;
        Ok(())
    }

    async fn set_playing(&self, playing: bool) -> anyhow::Result<()> {
        self.record(RecordedCall::SetPlaying(playing)).await;
        Ok(())
    }

    async fn say_hello(&self) -> anyhow::Result<()> {
        self.record(RecordedCall::SayHello).await;
        Ok(())
    }

    async fn create_lobby(&self, details: &LobbyDetails) -> anyhow::Result<()> {
        self.record(RecordedCall::CreateLobby(details.clone())).await;
        Ok(())
    }

    async fn set_lobby_details(&self, details: &LobbyDetails) -> anyhow::Result<()> {
        self.record(RecordedCall::SetLobbyDetails(details.clone())).await;
        Ok(())
    }

    async fn launch_lobby(&self) -> anyhow::Result<()> {
        self.record(RecordedCall::LaunchLobby).await;
        Ok(())
    }

    async fn invite_lobby_member(&self, steam_id: SteamId) -> anyhow::Result<()> {
        self.record(RecordedCall::InviteLobbyMember(steam_id)).await;
        Ok(())
    }

    async fn kick_lobby_member_from_team(&self, account_id32: u32) -> anyhow::Result<()> {
        self.record(RecordedCall::KickLobbyMemberFromTeam(account_id32)).await;
        Ok(())
    }

    async fn send_channel_message(&self, lobby_id: u64, text: &str) -> anyhow::Result<()> {
        self.record(RecordedCall::SendChannelMessage {
            lobby_id,
            text: text.to_string(),
        })
        .await;
        Ok(())
    }

    async fn disconnect(&self) -> anyhow::Result<()> {
        self.record(RecordedCall::Disconnect).await;
        Ok(())
    }

    fn steam_id(&self) -> SteamId {
        self.steam_id
    }
}

/// [`GcClientFactory`] backed by [`FakeGcClient`]. Hands out a distinct bot
/// Steam id per game so multiple sessions' `FakeGcClient`s never collide.
pub struct FakeGcClientFactory {
    next_steam_id: AtomicU64,
}

impl FakeGcClientFactory {
    pub fn new(first_steam_id: SteamId) -> Self {
        Self {
            next_steam_id: AtomicU64::new(first_steam_id),
        }
    }
}

impl Default for FakeGcClientFactory {
    fn default() -> Self {
        Self::new(76_561_198_000_000_000)
    }
}

#[async_trait]
impl GcClientFactory for FakeGcClientFactory {
    async fn create(
        &self,
        _game_id: &str,
    ) -> anyhow::Result<(Arc<dyn GcClient>, mpsc::UnboundedReceiver<GcEvent>)> {
        let steam_id = self.next_steam_id.fetch_add(1, Ordering::Relaxed);
        let (client, _tx, rx) = FakeGcClient::new(steam_id);
        Ok((client, rx))
    }
}
