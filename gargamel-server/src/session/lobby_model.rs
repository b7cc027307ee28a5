//! Pure diff detection between a freshly parsed lobby snapshot and the
//! session's change-detection scalars. No locks, no I/O — `lifecycle`
//! captures the `ObservedFields` values under lock, calls this, and only
//! then decides what to do with the verdict.

use gargamel_gc::LobbySnapshot;
use gargamel_shared::ServerRegion;

pub struct SnapshotDiff {
    pub first_observed: bool,
    pub region_changed: bool,
    pub cheats_changed: bool,
}

pub fn diff(
    snapshot: &LobbySnapshot,
    prev_lobby_id: u64,
    last_known_region: Option<ServerRegion>,
    last_known_allow_cheats: Option<bool>,
) -> SnapshotDiff {
    let observed_region = ServerRegion::try_from(snapshot.server_region).ok();
    SnapshotDiff {
        first_observed: prev_lobby_id == 0 && snapshot.lobby_id != 0,
        // `None` means never observed: the first observation is always a
        // no-op diff, not a change. Compares against the GC's own
        // previously observed region, not the configured one — an
        // operator-initiated config change is applied directly by the
        // control handler, not detected here.
        region_changed: match (last_known_region, observed_region) {
            (Some(prev), Some(cur)) => prev != cur,
            _ => false,
        },
        cheats_changed: match last_known_allow_cheats {
            None => false,
            Some(prev) => prev != snapshot.allow_cheats,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gargamel_gc::LobbyModel;

    fn snapshot(lobby_id: u64, allow_cheats: bool) -> LobbySnapshot {
        LobbyModel::parse(&gargamel_gc::RawLobbyObject {
            lobby_id,
            allow_cheats,
            server_region: ServerRegion::UsEast.as_i32(),
            ..Default::default()
        })
    }

    fn snapshot_with_region(lobby_id: u64, region: ServerRegion) -> LobbySnapshot {
        LobbyModel::parse(&gargamel_gc::RawLobbyObject {
            lobby_id,
            server_region: region.as_i32(),
            ..Default::default()
        })
    }

    #[test]
    fn first_observed_only_on_zero_to_nonzero_transition() {
        let d = diff(&snapshot(42, false), 0, None, None);
        assert!(d.first_observed);

        let d = diff(&snapshot(42, false), 42, Some(ServerRegion::UsEast), None);
        assert!(!d.first_observed);
    }

    #[test]
    fn allow_cheats_first_observation_is_never_a_change() {
        let d = diff(&snapshot(1, true), 1, Some(ServerRegion::UsEast), None);
        assert!(!d.cheats_changed);

        let d = diff(&snapshot(1, true), 1, Some(ServerRegion::UsEast), Some(false));
        assert!(d.cheats_changed);
    }

    #[test]
    fn region_changed_compares_against_last_observed_gc_region_not_config() {
        // Never observed before: no-op diff, same as allow-cheats.
        let d = diff(&snapshot_with_region(1, ServerRegion::EuWest), 1, None, None);
        assert!(!d.region_changed);

        // GC now reports a different region than it last reported.
        let d = diff(
            &snapshot_with_region(1, ServerRegion::EuWest),
            1,
            Some(ServerRegion::UsEast),
            None,
        );
        assert!(d.region_changed);

        // Unchanged from last observed GC region.
        let d = diff(
            &snapshot_with_region(1, ServerRegion::UsEast),
            1,
            Some(ServerRegion::UsEast),
            None,
        );
        assert!(!d.region_changed);
    }
}
