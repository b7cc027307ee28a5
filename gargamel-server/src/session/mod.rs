//! Per-game lifecycle state machine: state, reactions to protocol events and
//! control commands, pure diffing, outbound reporting, and teardown.

pub mod lifecycle;
pub mod lobby_model;
pub mod result_reporter;
pub mod state;
pub mod teardown;

pub use state::GameSession;

#[cfg(test)]
pub use state::test_support;
