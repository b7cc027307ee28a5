//! Process-wide, concurrency-safe map from game-id to [`GameSession`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::session::GameSession;

#[derive(Default)]
pub struct GameRegistry {
    games: RwLock<HashMap<String, Arc<GameSession>>>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails (returns `false`) if `game_id` is already present.
    pub async fn add(&self, session: Arc<GameSession>) -> bool {
        let mut games = self.games.write().await;
        if games.contains_key(&session.game_id) {
            return false;
        }
        games.insert(session.game_id.clone(), session);
        true
    }

    pub async fn lookup(&self, game_id: &str) -> Option<Arc<GameSession>> {
        self.games.read().await.get(game_id).cloned()
    }

    /// Idempotent: removing an absent id is a no-op.
    pub async fn remove(&self, game_id: &str) -> Option<Arc<GameSession>> {
        self.games.write().await.remove(game_id)
    }

    pub async fn list(&self) -> Vec<Arc<GameSession>> {
        self.games.read().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::test_session;

    #[tokio::test]
    async fn add_rejects_duplicate_ids() {
        let registry = GameRegistry::new();
        assert!(registry.add(test_session("g1")).await);
        assert!(!registry.add(test_session("g1")).await);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let registry = GameRegistry::new();
        registry.add(test_session("g1")).await;
        assert!(registry.remove("g1").await.is_some());
        assert!(registry.remove("g1").await.is_none());
    }

    #[tokio::test]
    async fn list_snapshots_current_games() {
        let registry = GameRegistry::new();
        registry.add(test_session("g1")).await;
        registry.add(test_session("g2")).await;
        let mut ids: Vec<_> = registry.list().await.iter().map(|s| s.game_id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["g1".to_string(), "g2".to_string()]);
    }
}
