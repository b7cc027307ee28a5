//! The Game Coordinator capability boundary.
//!
//! Everything in this crate models the underlying Steam-client and
//! Dota-protocol libraries as an external collaborator, behind one
//! interface. [`GcClient`] is that interface; [`fake::FakeGcClient`] is the
//! channel-driven double the rest of the workspace tests against.

pub mod client;
pub mod details;
pub mod events;
pub mod fake;
pub mod lobby_snapshot;

pub use client::{account_id32, GcClient, GcClientFactory};
pub use details::LobbyDetails;
pub use events::{try_speculative_match_details, ConnectionStatus, GcEvent, PartialMatchDetails};
pub use fake::{FakeGcClient, FakeGcClientFactory, RecordedCall};
pub use lobby_snapshot::{LobbyModel, LobbySnapshot, RawLobbyObject, RawMember};
