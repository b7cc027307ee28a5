//! A pure parse of GC lobby objects into the subset the session cares about.
//! No state lives here — each parse returns a value the session merges into
//! its own observed state with diff detection against its `lastKnown*`
//! fields.

use gargamel_shared::{Team, SteamId};
use serde::{Deserialize, Serialize};

/// Raw member record as handed to us by the underlying Dota client library.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawMember {
    pub steam_id: SteamId,
    pub team: i32,
    pub name: String,
}

/// Raw lobby object as handed to us by the underlying Dota client library —
/// everything the GC puts on the wire, most of which this system ignores.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawLobbyObject {
    pub lobby_id: u64,
    pub pass_key: String,
    pub server_region: i32,
    pub allow_cheats: bool,
    pub game_name: String,
    /// Aggregate lobby state. `3` means post-game.
    pub state: i32,
    /// Gamerules state, when present. `4` means `POST_GAME`.
    pub gamerules_state: Option<i32>,
    pub members: Vec<RawMember>,
    pub match_id: u64,
    pub match_outcome: i32,
}

/// The subset of a lobby object the session acts on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LobbySnapshot {
    pub lobby_id: u64,
    pub pass_key: String,
    pub server_region: i32,
    pub allow_cheats: bool,
    pub game_name: String,
    pub members: Vec<(SteamId, Team, String)>,
    pub match_id: u64,
    pub match_outcome: i32,
    pub is_post_game: bool,
}

const GAMERULES_STATE_POST_GAME: i32 = 4;
const LOBBY_STATE_POST_GAME: i32 = 3;

/// Stateless parser from raw GC lobby objects to the subset we act on.
pub struct LobbyModel;

impl LobbyModel {
    pub fn parse(raw: &RawLobbyObject) -> LobbySnapshot {
        let members = raw
            .members
            .iter()
            .filter_map(|m| {
                Team::try_from(m.team)
                    .ok()
                    .map(|team| (m.steam_id, team, m.name.clone()))
            })
            .collect();

        let is_post_game = raw.state == LOBBY_STATE_POST_GAME
            || raw.gamerules_state == Some(GAMERULES_STATE_POST_GAME);

        LobbySnapshot {
            lobby_id: raw.lobby_id,
            pass_key: raw.pass_key.clone(),
            server_region: raw.server_region,
            allow_cheats: raw.allow_cheats,
            game_name: raw.game_name.clone(),
            members,
            match_id: raw.match_id,
            match_outcome: raw.match_outcome,
            is_post_game,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_member_teams_and_drops_unknown() {
        let raw = RawLobbyObject {
            lobby_id: 42,
            members: vec![
                RawMember { steam_id: 1, team: 0, name: "a".into() },
                RawMember { steam_id: 2, team: 1, name: "b".into() },
                RawMember { steam_id: 3, team: 99, name: "bad".into() },
            ],
            ..Default::default()
        };
        let snap = LobbyModel::parse(&raw);
        assert_eq!(snap.lobby_id, 42);
        assert_eq!(snap.members.len(), 2);
        assert_eq!(snap.members[0].1, Team::Radiant);
        assert_eq!(snap.members[1].1, Team::Dire);
    }

    #[test]
    fn detects_post_game_from_state_or_gamerules() {
        let by_state = RawLobbyObject { state: 3, ..Default::default() };
        assert!(LobbyModel::parse(&by_state).is_post_game);

        let by_gamerules = RawLobbyObject {
            gamerules_state: Some(4),
            ..Default::default()
        };
        assert!(LobbyModel::parse(&by_gamerules).is_post_game);

        let neither = RawLobbyObject { state: 1, ..Default::default() };
        assert!(!LobbyModel::parse(&neither).is_post_game);
    }
}
