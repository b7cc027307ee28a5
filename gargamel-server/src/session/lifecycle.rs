//! Reactions to Steam/GC lifecycle events and control-plane commands: the
//! create sequence, invite policy, bot seating, the team seating loop,
//! launch, and post-game result assembly. [`crate::protocol`] owns the
//! event loop; this module is what it calls into.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use gargamel_gc::{account_id32, LobbyDetails, LobbySnapshot};
use gargamel_shared::{GameResult, LobbyMember, SessionState, Team};
use tokio::time::sleep;

use super::result_reporter;
use super::state::GameSession;
use super::teardown;

const INVITE_RETRY_DELAY: Duration = Duration::from_secs(3);
const LAUNCH_PRE_DISPATCH_PAUSE: Duration = Duration::from_millis(500);
const TEAM_CHECK_DEBOUNCE: Duration = Duration::from_secs(1);
const POST_LOGIN_PAUSE: Duration = Duration::from_secs(1);
const POST_HELLO_PAUSE: Duration = Duration::from_secs(3);

/// Reacts to the underlying client reporting a fresh TCP connection.
pub async fn on_connected(session: &Arc<GameSession>) -> Result<()> {
    let cfg = session.config.read().await;
    session
        .gc
        .log_on(&cfg.credentials.username, &cfg.credentials.password)
        .await
        .context("log_on")
}

/// Reacts to a successful Steam login: joins Dota 2, waits for GC bootstrap,
/// says hello, and issues the initial `CreateLobby`.
pub async fn on_logged_on(session: &Arc<GameSession>) -> Result<()> {
    session.gc.set_persona_state_online().await.context("set_persona_state_online")?;
    session.gc.set_games_played(570).await.context("set_games_played")?;
    sleep(Duration::from_secs(session.timing.gc_bootstrap_wait_secs)).await;

    session.gc.set_playing(true).await.context("set_playing")?;
    sleep(POST_LOGIN_PAUSE).await;
    session.gc.say_hello().await.context("say_hello")?;
    sleep(POST_HELLO_PAUSE).await;

    create_lobby(session).await
}

async fn create_lobby(session: &Arc<GameSession>) -> Result<()> {
    let details = {
        let cfg = session.config.read().await;
        LobbyDetails::for_create(&cfg)
    };
    session.gc.create_lobby(&details).await.context("create_lobby")?;
    session.reconnect.lock().await.lobby_should_exist = true;
    Ok(())
}

/// Reconnect path: re-issues `CreateLobby` if a lobby is expected to exist
/// but none has been assigned yet.
pub async fn recreate_lobby_if_needed(session: &Arc<GameSession>) -> Result<()> {
    let should_exist = session.reconnect.lock().await.lobby_should_exist;
    let lobby_id = session.observed.lock().await.lobby_id;
    if should_exist && lobby_id == 0 {
        create_lobby(session).await?;
    }
    Ok(())
}

/// Applies the full configured lobby-details tuple via `SetLobbyDetails`.
/// The GC treats this as an overwrite; callers never diff beforehand.
pub async fn apply_lobby_settings(session: &Arc<GameSession>) -> Result<()> {
    let details = {
        let cfg = session.config.read().await;
        LobbyDetails::for_reapply(&cfg)
    };
    session.gc.set_lobby_details(&details).await.context("set_lobby_details")
}

/// Merges a freshly parsed lobby snapshot into session state: updates
/// `lobbyId`, reapplies settings when warranted, schedules a bot-eject
/// check, runs the seating loop, and (for genuinely new lobby objects)
/// kicks off the invite pass.
pub async fn on_lobby_snapshot(session: &Arc<GameSession>, snapshot: LobbySnapshot, is_new: bool) {
    let (first_observed, settings_dirty) = {
        let mut observed = session.observed.lock().await;
        let diff = super::lobby_model::diff(
            &snapshot,
            observed.lobby_id,
            observed.last_known_region,
            observed.last_known_allow_cheats,
        );
        observed.lobby_id = snapshot.lobby_id;
        observed.last_known_region = gargamel_shared::ServerRegion::try_from(snapshot.server_region).ok();
        observed.last_known_allow_cheats = Some(snapshot.allow_cheats);
        (diff.first_observed, diff.first_observed || diff.region_changed || diff.cheats_changed)
    };

    if first_observed && matches!(*session.state.lock().await, SessionState::Creating) {
        session.set_state(SessionState::Waiting).await;
    }

    {
        let mut members = session.members.lock().await;
        members.clear();
        for (steam_id, team, name) in &snapshot.members {
            members.insert(
                *steam_id,
                LobbyMember {
                    steam_id: *steam_id,
                    team: *team,
                    name: name.clone(),
                },
            );
        }
    }

    if settings_dirty {
        if let Err(err) = apply_lobby_settings(session).await {
            tracing::warn!(game_id = %session.game_id, error = %err, "failed to reapply lobby settings");
        }
    }

    if snapshot.is_post_game {
        handle_post_game(session, &snapshot).await;
    }

    schedule_bot_eject_check(session.clone());
    run_team_assignments(session).await;

    if is_new {
        let invites_already_sent = *session.invites_sent.lock().await;
        if !invites_already_sent {
            spawn_invite_pass(session.clone());
        }
    }

    check_auto_poll(session).await;
}

/// Invite policy: fires once per new lobby object, after a stabilization
/// delay, unless the dota client/lobby isn't ready yet — in which case the
/// flag is reset and retried.
pub fn spawn_invite_pass(session: Arc<GameSession>) {
    tokio::spawn(async move {
        let mut cancel = session.cancel_receiver();
        tokio::select! {
            _ = sleep(Duration::from_secs(session.timing.invite_delay_secs)) => {}
            _ = cancel.changed() => return,
        }
        run_invite_pass(&session).await;
    });
}

async fn run_invite_pass(session: &Arc<GameSession>) {
    let lobby_id = session.observed.lock().await.lobby_id;
    if lobby_id == 0 {
        *session.invites_sent.lock().await = false;
        schedule_invite_retry(session.clone());
        return;
    }

    {
        let mut invites_sent = session.invites_sent.lock().await;
        if *invites_sent {
            return;
        }
        *invites_sent = true;
    }

    let (radiant, dire) = {
        let cfg = session.config.read().await;
        (cfg.radiant_roster.clone(), cfg.dire_roster.clone())
    };
    for steam_id in radiant.into_iter().chain(dire.into_iter()) {
        if steam_id == 0 {
            continue;
        }
        if let Err(err) = session.gc.invite_lobby_member(steam_id).await {
            tracing::warn!(game_id = %session.game_id, steam_id, error = %err, "invite failed");
        }
    }
}

fn schedule_invite_retry(session: Arc<GameSession>) {
    tokio::spawn(async move {
        let mut cancel = session.cancel_receiver();
        tokio::select! {
            _ = sleep(INVITE_RETRY_DELAY) => {}
            _ = cancel.changed() => return,
        }
        run_invite_pass(&session).await;
    });
}

/// Bot seating: whenever the bot's own Steam id is observed on a player
/// team, kick it to POOL. Re-checks after a delay if the flag never flips.
fn schedule_bot_eject_check(session: Arc<GameSession>) {
    tokio::spawn(async move {
        eject_bot_if_present(&session).await;
        let already_moved = session.observed.lock().await.bot_moved_to_unassigned;
        if already_moved {
            return;
        }
        let mut cancel = session.cancel_receiver();
        tokio::select! {
            _ = sleep(Duration::from_secs(session.timing.bot_eject_recheck_secs)) => {}
            _ = cancel.changed() => return,
        }
        let lobby_id = session.observed.lock().await.lobby_id;
        if lobby_id != 0 {
            eject_bot_if_present(&session).await;
        }
    });
}

async fn eject_bot_if_present(session: &Arc<GameSession>) {
    let bot_steam_id = session.gc.steam_id();
    let on_a_team = {
        let members = session.members.lock().await;
        members
            .get(&bot_steam_id)
            .map(|m| matches!(m.team, Team::Radiant | Team::Dire))
            .unwrap_or(false)
    };
    if !on_a_team {
        return;
    }
    if let Err(err) = session
        .gc
        .kick_lobby_member_from_team(account_id32(bot_steam_id))
        .await
    {
        tracing::warn!(game_id = %session.game_id, error = %err, "failed to eject bot to pool");
        return;
    }
    session.observed.lock().await.bot_moved_to_unassigned = true;
}

/// Debounced team seating loop: kicks any roster mismatch to POOL and
/// launches once both rosters are fully and correctly seated.
pub async fn run_team_assignments(session: &Arc<GameSession>) {
    {
        let mut last = session.team_check.lock().await;
        let now = Instant::now();
        if let Some(prev) = *last {
            if now.duration_since(prev) < TEAM_CHECK_DEBOUNCE {
                return;
            }
        }
        *last = Some(now);
    }

    let (expected_radiant, expected_dire) = {
        let cfg = session.config.read().await;
        (
            cfg.radiant_roster.iter().copied().collect::<std::collections::HashSet<_>>(),
            cfg.dire_roster.iter().copied().collect::<std::collections::HashSet<_>>(),
        )
    };

    let mismatched: Vec<_> = {
        let members = session.members.lock().await;
        members
            .values()
            .filter(|m| match m.team {
                Team::Radiant => !expected_radiant.contains(&m.steam_id),
                Team::Dire => !expected_dire.contains(&m.steam_id),
                _ => false,
            })
            .map(|m| m.steam_id)
            .collect()
    };
    for steam_id in mismatched {
        if let Err(err) = session
            .gc
            .kick_lobby_member_from_team(account_id32(steam_id))
            .await
        {
            tracing::warn!(game_id = %session.game_id, steam_id, error = %err, "failed to eject mis-seated member");
        }
    }

    let (radiant_count, dire_count) = {
        let members = session.members.lock().await;
        (
            members.values().filter(|m| m.team == Team::Radiant).count(),
            members.values().filter(|m| m.team == Team::Dire).count(),
        )
    };

    let polling_active = session.polling.lock().await.active;
    let polling_done = session.polling.lock().await.done;

    let fully_seated = radiant_count == expected_radiant.len()
        && dire_count == expected_dire.len()
        && !expected_radiant.is_empty()
        && !expected_dire.is_empty();

    if fully_seated && !polling_active {
        launch_game(session).await;
        session.observed.lock().await.seating_short_notice_sent = false;
    } else if polling_done && !fully_seated {
        let mut observed = session.observed.lock().await;
        if !observed.seating_short_notice_sent {
            observed.seating_short_notice_sent = true;
            drop(observed);
            let lobby_id = session.observed.lock().await.lobby_id;
            if let Err(err) = session
                .gc
                .send_channel_message(
                    lobby_id,
                    "Game polling finished, but not all players are seated…",
                )
                .await
            {
                tracing::warn!(game_id = %session.game_id, error = %err, "failed to send seating notice");
            }
        }
    }
}

/// Invariant 5: a no-op while `pollingActive`. Invariant 3: `gameLaunched`
/// flips false→true at most once; the check-then-set is intentionally
/// non-atomic per the documented concurrency model.
pub async fn launch_game(session: &Arc<GameSession>) {
    if session.polling.lock().await.active {
        return;
    }
    if session.observed.lock().await.game_launched {
        return;
    }

    session.set_state(SessionState::Launching).await;
    if let Err(err) = apply_lobby_settings(session).await {
        tracing::warn!(game_id = %session.game_id, error = %err, "failed to reapply settings before launch");
    }
    sleep(LAUNCH_PRE_DISPATCH_PAUSE).await;
    if let Err(err) = session.gc.launch_lobby().await {
        tracing::error!(game_id = %session.game_id, error = %err, "launch_lobby dispatch failed");
        session.force_error(format!("launch_lobby failed: {err}")).await;
        return;
    }

    let mut observed = session.observed.lock().await;
    observed.game_launched = true;
    observed.game_in_progress = true;
    drop(observed);
    session.set_state(SessionState::InProgress).await;
}

/// Auto-poll: when the observed member count crosses the threshold while
/// the lobby is still pre-launch, start polling and fire the poll-start
/// callback.
async fn check_auto_poll(session: &Arc<GameSession>) {
    let already_active_or_done = {
        let polling = session.polling.lock().await;
        polling.active || polling.done
    };
    if already_active_or_done {
        return;
    }
    let in_ui_state = matches!(
        *session.state.lock().await,
        SessionState::Creating | SessionState::Waiting
    );
    if !in_ui_state {
        return;
    }
    let count = session.members.lock().await.len();
    let threshold = session.config.read().await.auto_poll_threshold();
    if count > threshold {
        start_polling(session).await;
    }
}

pub async fn start_polling(session: &Arc<GameSession>) {
    {
        let mut polling = session.polling.lock().await;
        polling.active = true;
        polling.done = false;
    }
    let lobby_id = session.observed.lock().await.lobby_id;
    if let Err(err) = session
        .gc
        .send_channel_message(lobby_id, "Player polling has started.")
        .await
    {
        tracing::warn!(game_id = %session.game_id, error = %err, "failed to send poll-start chat notice");
    }
    let reporter_session = session.clone();
    tokio::spawn(async move {
        result_reporter::report_poll_start(&reporter_session).await;
    });
}

/// `action=end`: re-applies settings with the new mode and re-enters the
/// seating loop, which may now launch.
pub async fn end_polling(session: &Arc<GameSession>, new_mode: gargamel_shared::GameMode) {
    {
        let mut cfg = session.config.write().await;
        cfg.game_mode = new_mode;
    }
    {
        let mut polling = session.polling.lock().await;
        polling.active = false;
        polling.done = true;
    }
    if let Err(err) = apply_lobby_settings(session).await {
        tracing::warn!(game_id = %session.game_id, error = %err, "failed to reapply settings after poll end");
    }
    run_team_assignments(session).await;
}

/// Post-game: marks the lobby no longer in progress, transitions to
/// `postgame`, and opens (or updates) the pending result accumulator keyed
/// by match-id (falling back to lobby-id while the match-id is unknown).
pub async fn handle_post_game(session: &Arc<GameSession>, snapshot: &LobbySnapshot) {
    session.observed.lock().await.game_in_progress = false;
    session.set_state(SessionState::Postgame).await;

    let outcome = gargamel_shared::MatchOutcome::try_from(snapshot.match_outcome).unwrap_or_default();
    let key = if snapshot.match_id != 0 {
        snapshot.match_id
    } else {
        snapshot.lobby_id
    };

    let server_region = session.config.read().await.server_region;
    {
        let mut results = session.results.lock().await;
        let entry = results.entry(key).or_insert_with(|| GameResult::new(session.game_id.clone()));
        entry.lobby_id = snapshot.lobby_id;
        if snapshot.match_id != 0 {
            entry.match_id = snapshot.match_id;
        }
        if outcome.is_known() {
            entry.outcome = outcome;
        }
        entry.server_region = Some(server_region);
    }
    session.observed.lock().await.last_pending_key = Some(key);

    try_complete_result(session, key).await;
}

/// Merges a speculative or explicit match-details payload into the most
/// recently touched pending result, then attempts completion.
pub async fn merge_match_details(session: &Arc<GameSession>, details: gargamel_gc::PartialMatchDetails) {
    let key = if details.match_id != 0 {
        Some(details.match_id)
    } else {
        session.observed.lock().await.last_pending_key
    };
    let Some(key) = key else { return };

    let server_region = session.config.read().await.server_region;
    {
        let mut results = session.results.lock().await;
        let entry = results.entry(key).or_insert_with(|| GameResult::new(session.game_id.clone()));
        if entry.server_region.is_none() {
            entry.server_region = Some(server_region);
        }
        if entry.match_id == 0 && details.match_id != 0 {
            entry.match_id = details.match_id;
        }
        if let Some(outcome) = details.outcome {
            entry.outcome = outcome;
        }
        if let Some(duration) = details.duration {
            entry.duration = duration;
        }
        if let Some(start_time) = details.start_time {
            entry.start_time = start_time;
        }
        if let Some(radiant_score) = details.radiant_score {
            entry.radiant_score = radiant_score;
        }
        if let Some(dire_score) = details.dire_score {
            entry.dire_score = dire_score;
        }
        if let Some(lobby_type) = details.lobby_type {
            entry.lobby_type = lobby_type;
        }
        if details.game_mode.is_some() {
            entry.game_mode = details.game_mode;
        }
    }
    session.observed.lock().await.last_pending_key = Some(key);

    try_complete_result(session, key).await;
}

/// A result becomes complete once `match_id != 0` and `outcome` is known.
/// Only complete results are reported and cause teardown, and reporting
/// happens at most once per session.
pub async fn try_complete_result(session: &Arc<GameSession>, key: u64) {
    let complete = {
        let results = session.results.lock().await;
        results.get(&key).map(|r| r.is_complete()).unwrap_or(false)
    };
    if !complete {
        return;
    }
    let result = {
        let mut results = session.results.lock().await;
        results.remove(&key)
    };
    let Some(mut result) = result else { return };
    result.completed_at = result_reporter::now_unix_seconds();

    let reporter_session = session.clone();
    tokio::spawn(async move {
        result_reporter::report_final_result(&reporter_session, &result).await;
    });
    session.set_state(SessionState::Completed).await;
    teardown::teardown(session.clone()).await;
}
