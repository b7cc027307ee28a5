//! Outbound callbacks: poll-start and final-result POSTs. Both are
//! fire-and-forget — failure is logged, never retried, and never blocks the
//! caller or prevents teardown.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use gargamel_shared::{GameResult, PollStartCallback};

use super::state::GameSession;

pub fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// POSTs `{game_id, action: "start_poll"}` to the configured poll-callback
/// URL, if one is configured. No-op otherwise.
pub async fn report_poll_start(session: &Arc<GameSession>) {
    let url = session.config.read().await.poll_callback_url.clone();
    let Some(url) = url else { return };

    let body = PollStartCallback::new(session.game_id.clone());
    match session.http_client.post(&url).json(&body).send().await {
        Ok(resp) if resp.status().is_success() => {}
        Ok(resp) => {
            tracing::warn!(game_id = %session.game_id, status = %resp.status(), "poll-start callback rejected");
        }
        Err(err) => {
            tracing::warn!(game_id = %session.game_id, error = %err, "poll-start callback failed");
        }
    }
}

/// POSTs the complete `GameResult` to the session's result URL. Teardown
/// proceeds regardless of the outcome.
pub async fn report_final_result(session: &Arc<GameSession>, result: &GameResult) {
    let url = session.config.read().await.result_callback_url.clone();
    match session.http_client.post(&url).json(result).send().await {
        Ok(resp) if resp.status().is_success() => {
            tracing::info!(game_id = %session.game_id, match_id = result.match_id, "final result reported");
        }
        Ok(resp) => {
            tracing::warn!(game_id = %session.game_id, status = %resp.status(), "result callback rejected");
        }
        Err(err) => {
            tracing::warn!(game_id = %session.game_id, error = %err, "result callback failed");
        }
    }
}
