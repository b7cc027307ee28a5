//! [`GameSession`]: the per-game lifecycle state machine. Its mutable fields
//! are partitioned across independent mutexes so protocol work and control
//! requests never contend on a single lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use gargamel_gc::GcClient;
use gargamel_shared::{GameConfig, GameResult, LobbyMember, ServerRegion, SteamId};
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;

/// `reconnecting`, `lobbyShouldExist` — the reconnect-lock pair.
#[derive(Default, Clone, Copy)]
pub struct ReconnectFields {
    pub reconnecting: bool,
    pub lobby_should_exist: bool,
}

/// `pollingActive`, `pollingDone` — the polling-lock pair.
#[derive(Default, Clone, Copy)]
pub struct PollingFields {
    pub active: bool,
    pub done: bool,
}

/// Scalars used for change detection and one-shot transitions that the
/// named mutex table doesn't call out individually; grouped under one lock
/// since they are always read and mutated together by the protocol driver.
#[derive(Default)]
pub struct ObservedFields {
    pub lobby_id: u64,
    pub last_known_region: Option<ServerRegion>,
    pub last_known_allow_cheats: Option<bool>,
    pub bot_moved_to_unassigned: bool,
    pub game_launched: bool,
    pub game_in_progress: bool,
    pub last_pending_key: Option<u64>,
    pub seating_short_notice_sent: bool,
}

/// The process-level timing knobs a session needs, copied in at
/// construction so lifecycle code never has to reach back through
/// `AppState` for a handful of integers.
#[derive(Clone, Copy)]
pub struct TimingConfig {
    pub keepalive_interval_secs: u64,
    pub invite_delay_secs: u64,
    pub bot_eject_recheck_secs: u64,
    pub reconnect_delay_secs: u64,
    pub gc_bootstrap_wait_secs: u64,
}

impl From<&crate::config::Config> for TimingConfig {
    fn from(cfg: &crate::config::Config) -> Self {
        TimingConfig {
            keepalive_interval_secs: cfg.keepalive_interval_secs,
            invite_delay_secs: cfg.invite_delay_secs,
            bot_eject_recheck_secs: cfg.bot_eject_recheck_secs,
            reconnect_delay_secs: cfg.reconnect_delay_secs,
            gc_bootstrap_wait_secs: cfg.gc_bootstrap_wait_secs,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig::from(&crate::config::Config::default())
    }
}

pub struct GameSession {
    pub game_id: String,
    pub timing: TimingConfig,
    /// Mutable settings plus immutable identity; config-lock, an extension
    /// of the named partition for the fields the control plane updates.
    pub config: RwLock<GameConfig>,
    pub members: Mutex<HashMap<SteamId, LobbyMember>>,
    pub results: Mutex<HashMap<u64, GameResult>>,
    pub state: Mutex<gargamel_shared::SessionState>,
    pub team_check: Mutex<Option<Instant>>,
    pub reconnect: Mutex<ReconnectFields>,
    pub keepalive_running: Mutex<bool>,
    pub polling: Mutex<PollingFields>,
    pub invites_sent: Mutex<bool>,
    pub observed: Mutex<ObservedFields>,
    pub gc: Arc<dyn GcClient>,
    pub http_client: reqwest::Client,
    pub cancel_tx: watch::Sender<bool>,
    pub driver_handle: Mutex<Option<JoinHandle<()>>>,
    /// Set once by the control handler right after registering the session,
    /// so `teardown` can deregister itself without the registry having to
    /// track teardown state on the session's behalf.
    pub registry: Mutex<Option<Arc<crate::registry::GameRegistry>>>,
    /// Guards `teardown` so a second call (explicit delete racing a result
    /// POST, or shutdown racing both) is a no-op.
    pub torn_down: Mutex<bool>,
}

impl GameSession {
    pub fn new(
        config: GameConfig,
        gc: Arc<dyn GcClient>,
        http_client: reqwest::Client,
        timing: TimingConfig,
    ) -> Arc<Self> {
        let (cancel_tx, _rx) = watch::channel(false);
        Arc::new(Self {
            game_id: config.game_id.clone(),
            timing,
            config: RwLock::new(config),
            members: Mutex::new(HashMap::new()),
            results: Mutex::new(HashMap::new()),
            state: Mutex::new(gargamel_shared::SessionState::Creating),
            team_check: Mutex::new(None),
            reconnect: Mutex::new(ReconnectFields::default()),
            keepalive_running: Mutex::new(false),
            polling: Mutex::new(PollingFields::default()),
            invites_sent: Mutex::new(false),
            observed: Mutex::new(ObservedFields::default()),
            gc,
            http_client,
            cancel_tx,
            driver_handle: Mutex::new(None),
            registry: Mutex::new(None),
            torn_down: Mutex::new(false),
        })
    }

    pub async fn attach_registry(&self, registry: Arc<crate::registry::GameRegistry>) {
        *self.registry.lock().await = Some(registry);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    pub fn cancel_receiver(&self) -> watch::Receiver<bool> {
        self.cancel_tx.subscribe()
    }

    /// Invariant 4: `state` never moves backwards out of `postgame`,
    /// `completed`, or `error` — except the forward moves into `completed`
    /// or `error` themselves, which `try_complete_result` and `force_error`
    /// rely on.
    pub async fn set_state(&self, new_state: gargamel_shared::SessionState) {
        let mut state = self.state.lock().await;
        if !state.allows_transition_to(&new_state) {
            return;
        }
        *state = new_state;
    }

    pub async fn force_error(&self, message: impl Into<String>) {
        let mut state = self.state.lock().await;
        *state = gargamel_shared::SessionState::Error {
            message: message.into(),
        };
    }

    pub async fn status(&self) -> gargamel_shared::GameStatus {
        let cfg = self.config.read().await;
        let state = self.state.lock().await;
        let polling = self.polling.lock().await;
        let observed = self.observed.lock().await;

        // Configured rosters, not the GC-observed seating: the latter lags
        // a `swap`/replace by up to one snapshot poll, and callers that just
        // issued one expect the status to already reflect it.
        let radiant_team = cfg.radiant_roster.clone();
        let dire_team = cfg.dire_roster.clone();

        let error = match &*state {
            gargamel_shared::SessionState::Error { message } => Some(message.clone()),
            _ => None,
        };

        gargamel_shared::GameStatus {
            game_id: self.game_id.clone(),
            state: state.label().to_string(),
            lobby_id: observed.lobby_id,
            game_mode: cfg.game_mode,
            server_region: cfg.server_region,
            allow_cheats: cfg.allow_cheats,
            radiant_count: radiant_team.len(),
            dire_count: dire_team.len(),
            radiant_team,
            dire_team,
            polling_active: polling.active,
            polling_done: polling.done,
            pass_key: cfg.pass_key.clone(),
            error,
        }
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use gargamel_gc::FakeGcClient;
    use gargamel_shared::Credentials;

    pub fn test_config(game_id: &str) -> GameConfig {
        GameConfig {
            game_id: game_id.to_string(),
            credentials: Credentials {
                username: "bot".into(),
                password: "secret".into(),
            },
            radiant_roster: vec![1, 2],
            dire_roster: vec![3, 4],
            result_callback_url: "http://localhost/result".into(),
            poll_callback_url: None,
            server_region: ServerRegion::default(),
            game_mode: Default::default(),
            allow_cheats: false,
            game_name: GameConfig::default_game_name(game_id),
            pass_key: String::new(),
            debug_steam_id: None,
        }
    }

    pub fn test_session(game_id: &str) -> Arc<GameSession> {
        let (client, _tx, _rx) = FakeGcClient::new(999);
        GameSession::new(
            test_config(game_id),
            client,
            reqwest::Client::new(),
            TimingConfig::default(),
        )
    }
}
