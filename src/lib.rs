//! NZBGet post-processing extension that notifies a Jellyfin/Emby server.
//!
//! After a download completes NZBGet runs the extension, which asks the media
//! server to refresh its libraries. The "ping" command button only checks that
//! the server is reachable.

pub mod app;
pub mod app_mode;
pub mod config;
pub mod services;

pub use app::{ExitStatus, run};
pub use app_mode::RunMode;
pub use config::{Config, ConfigError};
