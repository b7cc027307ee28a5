//! The Steam/GC connection event loop: translates [`GcEvent`]s into session
//! method calls, maintains keepalive, and drives reconnect/recreate. The
//! session owns this worker's `JoinHandle`; this module owns none of the
//! session's state directly.

use std::sync::Arc;
use std::time::Duration;

use gargamel_gc::{try_speculative_match_details, ConnectionStatus, GcEvent};
use gargamel_shared::SessionState;
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::session::lifecycle;
use crate::session::GameSession;

/// Spawns the event loop and stores its handle on the session.
pub async fn spawn(session: Arc<GameSession>, events: mpsc::UnboundedReceiver<GcEvent>) {
    let driver_session = session.clone();
    let handle = tokio::spawn(async move {
        run(driver_session, events).await;
    });
    *session.driver_handle.lock().await = Some(handle);
}

async fn run(session: Arc<GameSession>, mut events: mpsc::UnboundedReceiver<GcEvent>) {
    let mut cancel = session.cancel_receiver();
    loop {
        tokio::select! {
            biased;
            _ = cancel.changed() => {
                tracing::info!(game_id = %session.game_id, "protocol driver cancelled");
                return;
            }
            event = events.recv() => {
                let Some(event) = event else {
                    tracing::warn!(game_id = %session.game_id, "event channel closed");
                    return;
                };
                dispatch(&session, event).await;
            }
        }
    }
}

async fn dispatch(session: &Arc<GameSession>, event: GcEvent) {
    match event {
        GcEvent::Connected => {
            if let Err(err) = lifecycle::on_connected(session).await {
                tracing::error!(game_id = %session.game_id, error = %err, "connect sequence failed");
                session.force_error(format!("connect failed: {err}")).await;
            }
        }
        GcEvent::LoggedOn => {
            if let Err(err) = lifecycle::on_logged_on(session).await {
                tracing::error!(game_id = %session.game_id, error = %err, "bootstrap sequence failed");
                session.force_error(format!("bootstrap failed: {err}")).await;
            }
        }
        GcEvent::ConnectionStatusChanged(status) => handle_connection_status(session, status).await,
        GcEvent::PracticeLobbyUpdate(snapshot) => {
            lifecycle::on_lobby_snapshot(session, snapshot, false).await;
        }
        GcEvent::SoMultipleObjects { added, modified } => {
            for snapshot in added {
                lifecycle::on_lobby_snapshot(session, snapshot, true).await;
            }
            for snapshot in modified {
                lifecycle::on_lobby_snapshot(session, snapshot, false).await;
            }
        }
        GcEvent::MatchDetails(details) | GcEvent::UpdateMatchDetails(details) => {
            lifecycle::merge_match_details(session, details).await;
        }
        GcEvent::Unmodeled { body } => {
            if result_pending_or_in_progress(session).await {
                if let Some(details) = try_speculative_match_details(&body) {
                    lifecycle::merge_match_details(session, details).await;
                }
            } else {
                tracing::debug!(game_id = %session.game_id, "dropped unmodeled packet");
            }
        }
        GcEvent::Disconnected => {
            handle_connection_status(session, ConnectionStatus::NoSession).await;
        }
    }
}

async fn result_pending_or_in_progress(session: &Arc<GameSession>) -> bool {
    let in_progress = matches!(
        *session.state.lock().await,
        SessionState::InProgress | SessionState::Postgame
    );
    in_progress || !session.results.lock().await.is_empty()
}

async fn handle_connection_status(session: &Arc<GameSession>, status: ConnectionStatus) {
    match status {
        ConnectionStatus::NoSession => {
            session.reconnect.lock().await.reconnecting = true;
            tracing::warn!(game_id = %session.game_id, "GC session lost, reconnecting");
            spawn_reconnect_action(session.clone());
        }
        ConnectionStatus::HaveSession => {
            session.reconnect.lock().await.reconnecting = false;
            {
                let mut observed = session.observed.lock().await;
                observed.lobby_id = 0;
                observed.last_known_region = None;
                observed.last_known_allow_cheats = None;
                observed.bot_moved_to_unassigned = false;
                observed.game_launched = false;
            }
            *session.invites_sent.lock().await = false;
            start_keepalive(session.clone());
            spawn_recreate_check(session.clone());
        }
    }
}

async fn start_keepalive(session: Arc<GameSession>) {
    {
        let mut running = session.keepalive_running.lock().await;
        if *running {
            return;
        }
        *running = true;
    }
    tokio::spawn(async move {
        let mut cancel = session.cancel_receiver();
        loop {
            tokio::select! {
                biased;
                _ = cancel.changed() => break,
                _ = sleep(Duration::from_secs(session.timing.keepalive_interval_secs)) => {
                    if !*session.keepalive_running.lock().await {
                        break;
                    }
                    if let Err(err) = session.gc.say_hello().await {
                        tracing::warn!(game_id = %session.game_id, error = %err, "keepalive SayHello failed");
                    }
                }
            }
        }
    });
}

fn spawn_reconnect_action(session: Arc<GameSession>) {
    tokio::spawn(async move {
        let mut cancel = session.cancel_receiver();
        tokio::select! {
            _ = sleep(Duration::from_secs(session.timing.reconnect_delay_secs)) => {}
            _ = cancel.changed() => return,
        }
        if !session.reconnect.lock().await.reconnecting {
            return;
        }
        if let Err(err) = session.gc.set_playing(true).await {
            tracing::warn!(game_id = %session.game_id, error = %err, "reconnect set_playing failed");
        }
        if let Err(err) = session.gc.say_hello().await {
            tracing::warn!(game_id = %session.game_id, error = %err, "reconnect say_hello failed");
        }
    });
}

fn spawn_recreate_check(session: Arc<GameSession>) {
    tokio::spawn(async move {
        let mut cancel = session.cancel_receiver();
        tokio::select! {
            _ = sleep(Duration::from_secs(session.timing.reconnect_delay_secs)) => {}
            _ = cancel.changed() => return,
        }
        if let Err(err) = lifecycle::recreate_lobby_if_needed(&session).await {
            tracing::warn!(game_id = %session.game_id, error = %err, "lobby re-create failed");
        }
    });
}
