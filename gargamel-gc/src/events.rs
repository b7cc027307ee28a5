//! Events the Game Coordinator pushes to a connected session.

use gargamel_shared::{GameMode, MatchOutcome, ServerRegion};

use crate::lobby_snapshot::LobbySnapshot;

/// GC session connection status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    HaveSession,
    NoSession,
}

/// Fields a match-details-shaped response can contribute. Every field is
/// optional because the GC may dribble these out across more than one
/// packet; the session merges non-`None` fields into its pending
/// accumulator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PartialMatchDetails {
    pub match_id: u64,
    pub duration: Option<u32>,
    pub start_time: Option<u32>,
    pub outcome: Option<MatchOutcome>,
    pub radiant_score: Option<u32>,
    pub dire_score: Option<u32>,
    pub lobby_type: Option<i32>,
    pub game_mode: Option<GameMode>,
}

impl PartialMatchDetails {
    pub fn has_any_payload(&self) -> bool {
        self.duration.is_some() || self.start_time.is_some() || self.outcome.is_some()
    }
}

/// Events surfaced by [`crate::GcClient`] implementations, plus connection
/// lifecycle. Only three message shapes matter for core logic; everything
/// else is either forwarded to the underlying Dota library unchanged (out of
/// scope here) or, while a game is in progress or has pending results,
/// offered to the speculative match-details decoder via [`GcEvent::Unmodeled`].
#[derive(Clone, Debug, PartialEq)]
pub enum GcEvent {
    Connected,
    LoggedOn,
    ConnectionStatusChanged(ConnectionStatus),
    /// `PracticeLobbyUpdate`: parse as lobby-set-details. Never triggers
    /// invites — only `SOMultipleObjects`'s added objects do.
    PracticeLobbyUpdate(LobbySnapshot),
    /// `SOMultipleObjects`: added objects are treated as *new* (may trigger
    /// invites); modified objects are treated as *updated* (never invite).
    SoMultipleObjects {
        added: Vec<LobbySnapshot>,
        modified: Vec<LobbySnapshot>,
    },
    MatchDetails(PartialMatchDetails),
    UpdateMatchDetails(PartialMatchDetails),
    /// Any packet the driver does not model directly. Carries the raw body
    /// so the driver can speculatively try a match-details decode while a
    /// game is in progress or has pending results.
    Unmodeled { body: Vec<u8> },
    Disconnected,
}

/// Bounded, cheap, idempotent speculative decode of an unmodeled packet body
/// as match details. Some GC builds deliver match results on message codes
/// this driver doesn't otherwise model, so any unmodeled packet seen while a
/// result is outstanding gets one shot at this decode.
///
/// Layout (a minimal placeholder for the GC's actual encoding, which lives
/// entirely in the external library this crate fronts): bytes 0..8 are the
/// match id (little-endian `u64`); if present and non-zero, bytes 8..9 are
/// the outcome, bytes 9..13 the duration (little-endian `u32`). Anything
/// shorter than that yields a bare match id with no duration/outcome.
pub fn try_speculative_match_details(body: &[u8]) -> Option<PartialMatchDetails> {
    if body.len() <= 10 {
        return None;
    }
    let match_id = u64::from_le_bytes(body[0..8].try_into().ok()?);
    if match_id == 0 {
        return None;
    }
    let mut details = PartialMatchDetails {
        match_id,
        ..Default::default()
    };
    if body.len() >= 9 {
        if let Ok(outcome) = MatchOutcome::try_from(body[8] as i32) {
            details.outcome = Some(outcome);
        }
    }
    if body.len() >= 13 {
        details.duration = Some(u32::from_le_bytes(body[9..13].try_into().ok()?));
    }
    if details.has_any_payload() || details.match_id != 0 {
        Some(details)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_never_decode() {
        assert!(try_speculative_match_details(&[1; 10]).is_none());
    }

    #[test]
    fn decodes_match_id_outcome_and_duration() {
        let mut body = vec![0u8; 13];
        body[0..8].copy_from_slice(&77u64.to_le_bytes());
        body[8] = 2; // RadiantWin
        body[9..13].copy_from_slice(&1800u32.to_le_bytes());
        let decoded = try_speculative_match_details(&body).unwrap();
        assert_eq!(decoded.match_id, 77);
        assert_eq!(decoded.outcome, Some(MatchOutcome::RadiantWin));
        assert_eq!(decoded.duration, Some(1800));
    }

    #[test]
    fn zero_match_id_is_rejected() {
        let body = vec![0u8; 13];
        assert!(try_speculative_match_details(&body).is_none());
    }
}
