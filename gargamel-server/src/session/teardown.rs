//! Orderly shutdown of a single session: stop keepalive, cancel every
//! background worker, disconnect the Game Coordinator client, deregister,
//! and mark the session `completed`. Idempotent — the second call after the
//! first has run is a no-op.

use std::sync::Arc;

use gargamel_shared::SessionState;

use super::state::GameSession;

pub async fn teardown(session: Arc<GameSession>) {
    {
        let mut torn_down = session.torn_down.lock().await;
        if *torn_down {
            return;
        }
        *torn_down = true;
    }

    tracing::info!(game_id = %session.game_id, "tearing down session");

    *session.keepalive_running.lock().await = false;
    let _ = session.cancel_tx.send(true);

    if let Err(err) = session.gc.disconnect().await {
        tracing::warn!(game_id = %session.game_id, error = %err, "disconnect failed during teardown");
    }

    if let Some(handle) = session.driver_handle.lock().await.take() {
        handle.abort();
    }

    {
        let mut state = session.state.lock().await;
        if !matches!(*state, SessionState::Error { .. }) {
            *state = SessionState::Completed;
        }
    }

    let registry = session.registry.lock().await.clone();
    if let Some(registry) = registry {
        registry.remove(&session.game_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::GameRegistry;
    use crate::session::test_support::test_session;

    #[tokio::test]
    async fn teardown_is_idempotent_and_deregisters() {
        let registry = Arc::new(GameRegistry::new());
        let session = test_session("g1");
        registry.add(session.clone()).await;
        session.attach_registry(registry.clone()).await;

        teardown(session.clone()).await;
        assert!(registry.lookup("g1").await.is_none());
        assert!(session.is_cancelled());

        // Second call must not panic or re-run side effects.
        teardown(session.clone()).await;
    }
}
