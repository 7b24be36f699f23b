//! External service integrations

pub mod logging;
pub mod media_server;

pub use media_server::{MediaServerClient, NotifyError};
