//! Data model shared between the lobby server and its HTTP control plane.

pub mod api;
pub mod config_model;
pub mod member;
pub mod result;
pub mod status;

pub use api::*;
pub use config_model::*;
pub use member::*;
pub use result::*;
pub use status::*;
