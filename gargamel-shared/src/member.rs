//! Lobby membership: team assignment and the observed player list.

use serde::{Deserialize, Serialize};

use crate::config_model::SteamId;

/// A lobby seat. `Pool` is the GC's "unassigned" slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Team {
    Radiant,
    Dire,
    Spectator,
    Pool,
}

impl Team {
    pub fn as_i32(self) -> i32 {
        match self {
            Team::Radiant => 0,
            Team::Dire => 1,
            Team::Spectator => 2,
            Team::Pool => 3,
        }
    }
}

impl TryFrom<i32> for Team {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Team::Radiant),
            1 => Ok(Team::Dire),
            2 => Ok(Team::Spectator),
            3 => Ok(Team::Pool),
            other => Err(format!("unknown team {other}")),
        }
    }
}

impl From<Team> for i32 {
    fn from(value: Team) -> Self {
        value.as_i32()
    }
}

/// One observed lobby member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LobbyMember {
    pub steam_id: SteamId,
    pub team: Team,
    pub name: String,
}
