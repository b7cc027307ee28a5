//! Handlers for the HTTP control surface. Each parses and validates its
//! body, looks up the session, dispatches synchronously (mutating config or
//! enqueuing protocol work), and returns immediately — protocol work
//! continues in the session's own background workers.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Json, Router};
use gargamel_shared::{
    ChatRequest, CreateGameRequest, CreateGameResponse, Credentials, GameConfig, PollAction,
    PollRequest, ReplaceRequest, StatusResponse, SwapRequest, Team, UpdateGameRequest,
};

use crate::error::AppError;
use crate::session::{lifecycle, GameSession};

use super::AppState;

pub async fn create_game(
    State(state): State<AppState>,
    Json(req): Json<CreateGameRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.game_id.trim().is_empty() {
        return Err(AppError::InvalidRequest("game_id must not be empty".into()));
    }
    let radiant: HashSet<_> = req.radiant_team.iter().copied().collect();
    if req.dire_team.iter().any(|id| radiant.contains(id)) {
        return Err(AppError::InvalidRequest(
            "a Steam id cannot appear on both rosters".into(),
        ));
    }
    if state.registry.lookup(&req.game_id).await.is_some() {
        return Err(AppError::GameExists(req.game_id));
    }

    let game_name = req
        .game_name
        .clone()
        .unwrap_or_else(|| GameConfig::default_game_name(&req.game_id));
    let config = GameConfig {
        game_id: req.game_id.clone(),
        credentials: Credentials {
            username: req.username,
            password: req.password.clone(),
        },
        radiant_roster: req.radiant_team,
        dire_roster: req.dire_team,
        result_callback_url: req.result_url,
        poll_callback_url: req.poll_callback_url,
        server_region: req.server_region.unwrap_or_default(),
        game_mode: req.game_mode.unwrap_or_default(),
        allow_cheats: req.allow_cheats.unwrap_or(false),
        game_name,
        pass_key: req.pass_key.unwrap_or_default(),
        debug_steam_id: req.debug_steam_id,
    };

    let (gc, events) = state
        .gc_factory
        .create(&config.game_id)
        .await
        .map_err(|err| AppError::InvalidRequest(format!("could not start GC session: {err}")))?;

    let session = GameSession::new(config, gc, state.http_client.clone(), state.timing);
    if !state.registry.add(session.clone()).await {
        return Err(AppError::GameExists(session.game_id.clone()));
    }
    session.attach_registry(state.registry.clone()).await;

    crate::protocol::spawn(session.clone(), events).await;
    let bootstrap_session = session.clone();
    tokio::spawn(async move {
        if let Err(err) = bootstrap_session.gc.connect().await {
            tracing::error!(game_id = %bootstrap_session.game_id, error = %err, "connect dispatch failed");
            bootstrap_session.force_error(format!("connect failed: {err}")).await;
        }
    });

    let password = session.config.read().await.credentials.password.clone();
    Ok(Json(CreateGameResponse {
        game_id: session.game_id.clone(),
        status: "creating",
        password,
    }))
}

pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = lookup(&state, &game_id).await?;
    Ok(Json(session.status().await))
}

pub async fn list_games(State(state): State<AppState>) -> impl IntoResponse {
    let sessions = state.registry.list().await;
    let mut statuses = Vec::with_capacity(sessions.len());
    for session in sessions {
        statuses.push(session.status().await);
    }
    Json(statuses)
}

pub async fn update_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(req): Json<UpdateGameRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = lookup(&state, &game_id).await?;

    let lobby_exists = {
        let mut cfg = session.config.write().await;
        if let Some(mode) = req.game_mode {
            cfg.game_mode = mode;
        }
        if let Some(region) = req.server_region {
            cfg.server_region = region;
        }
        if let Some(allow_cheats) = req.allow_cheats {
            cfg.allow_cheats = allow_cheats;
        }
        if let Some(name) = req.game_name {
            cfg.game_name = name;
        }
        session.observed.lock().await.lobby_id != 0
    };

    if lobby_exists {
        if let Err(err) = lifecycle::apply_lobby_settings(&session).await {
            tracing::warn!(game_id = %session.game_id, error = %err, "failed to reapply settings after update");
        }
    }

    Ok(Json(StatusResponse::new("updated")))
}

pub async fn delete_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = lookup(&state, &game_id).await?;
    crate::session::teardown::teardown(session).await;
    Ok(Json(StatusResponse::new("deleted")))
}

pub async fn swap_members(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(req): Json<SwapRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = lookup(&state, &game_id).await?;

    let mut cfg = session.config.write().await;
    let first_team = roster_team_of(&cfg, req.steam_id_1);
    let second_team = roster_team_of(&cfg, req.steam_id_2);
    match (first_team, second_team) {
        (Some(Team::Radiant), Some(Team::Dire)) | (Some(Team::Dire), Some(Team::Radiant)) => {
            remove_from_rosters(&mut cfg, req.steam_id_1);
            remove_from_rosters(&mut cfg, req.steam_id_2);
            if first_team == Some(Team::Radiant) {
                cfg.dire_roster.push(req.steam_id_1);
                cfg.radiant_roster.push(req.steam_id_2);
            } else {
                cfg.radiant_roster.push(req.steam_id_1);
                cfg.dire_roster.push(req.steam_id_2);
            }
        }
        _ => {
            return Err(AppError::BadSwap(
                "Players must be on opposite teams".into(),
            ));
        }
    }
    drop(cfg);

    lifecycle::run_team_assignments(&session).await;
    Ok(Json(StatusResponse::new("swapped")))
}

pub async fn replace_member(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(req): Json<ReplaceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = lookup(&state, &game_id).await?;

    let mut cfg = session.config.write().await;
    if roster_team_of(&cfg, req.new_steam_id).is_some() {
        return Err(AppError::BadReplace(
            "new Steam id is already present in a roster".into(),
        ));
    }
    match roster_team_of(&cfg, req.old_steam_id) {
        Some(Team::Radiant) => {
            remove_from_rosters(&mut cfg, req.old_steam_id);
            cfg.radiant_roster.push(req.new_steam_id);
        }
        Some(Team::Dire) => {
            remove_from_rosters(&mut cfg, req.old_steam_id);
            cfg.dire_roster.push(req.new_steam_id);
        }
        _ => {
            return Err(AppError::BadReplace(
                "old Steam id not found in either roster".into(),
            ));
        }
    }
    drop(cfg);

    lifecycle::run_team_assignments(&session).await;
    Ok(Json(StatusResponse::new("replaced")))
}

pub async fn send_chat(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = lookup(&state, &game_id).await?;
    let lobby_id = session.observed.lock().await.lobby_id;
    if lobby_id == 0 {
        return Err(AppError::InvalidRequest("no lobby yet".into()));
    }
    session
        .gc
        .send_channel_message(lobby_id, &req.message)
        .await
        .map_err(|err| AppError::InvalidRequest(format!("chat dispatch failed: {err}")))?;
    Ok(Json(StatusResponse::new("sent")))
}

pub async fn poll_action(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(req): Json<PollRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = lookup(&state, &game_id).await?;
    match req.action {
        PollAction::Start => {
            lifecycle::start_polling(&session).await;
            Ok(Json(StatusResponse::new("polling_started")))
        }
        PollAction::End => {
            let Some(mode) = req.game_mode else {
                return Err(AppError::InvalidRequest(
                    "action=end requires game_mode".into(),
                ));
            };
            lifecycle::end_polling(&session, mode).await;
            Ok(Json(StatusResponse::new("polling_ended")))
        }
    }
}

pub async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

async fn lookup(state: &AppState, game_id: &str) -> Result<Arc<GameSession>, AppError> {
    state
        .registry
        .lookup(game_id)
        .await
        .ok_or_else(|| AppError::NotFound(game_id.to_string()))
}

fn roster_team_of(cfg: &GameConfig, steam_id: u64) -> Option<Team> {
    if cfg.radiant_roster.contains(&steam_id) {
        Some(Team::Radiant)
    } else if cfg.dire_roster.contains(&steam_id) {
        Some(Team::Dire)
    } else {
        None
    }
}

fn remove_from_rosters(cfg: &mut GameConfig, steam_id: u64) {
    cfg.radiant_roster.retain(|id| *id != steam_id);
    cfg.dire_roster.retain(|id| *id != steam_id);
}

pub fn router() -> Router<AppState> {
    use axum::routing::{get, post};
    Router::new()
        .route("/healthz", get(healthz))
        .route("/game", post(create_game))
        .route("/games", get(list_games))
        .route("/game/:id", get(get_game).put(update_game).delete(delete_game))
        .route("/game/:id/swap", post(swap_members))
        .route("/game/:id/replace", post(replace_member))
        .route("/game/:id/chat", post(send_chat))
        .route("/poll/:id", post(poll_action))
}
