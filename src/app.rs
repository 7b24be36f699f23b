//! Notifier flow: pick the run mode, make one call, map the outcome to an exit status.
//!
//! Used by `main` and by the integration tests, which drive [run] against a
//! mock media server.

use std::process::ExitCode;

use tracing::{debug, error, info};

use crate::app_mode::RunMode;
use crate::config::Config;
use crate::services::MediaServerClient;

/// Exit codes understood by NZBGet post-processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    Success = 93,
    Error = 94,
    /// Nothing to do. Reserved, the notifier never reports it.
    None = 95,
}

impl ExitStatus {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Run the notifier once. Makes at most one HTTP request and never retries.
pub async fn run(config: &Config) -> ExitStatus {
    let base_url = match config.base_url() {
        Ok(url) => url,
        Err(e) => {
            error!("{}", e);
            return ExitStatus::Error;
        }
    };
    debug!("URL: {}", base_url);

    let client = match MediaServerClient::new(base_url, config.api_key.as_str(), config.timeout) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            return ExitStatus::Error;
        }
    };

    match RunMode::from_command(config.command.as_deref()) {
        RunMode::Ping => ping_server(&client).await,
        RunMode::Refresh => {
            let path = match config.target_path() {
                Ok(path) => path,
                Err(e) => {
                    error!("{}", e);
                    return ExitStatus::Error;
                }
            };
            debug!("PATH: {}", path.display());

            refresh_library(&client).await
        }
    }
}

async fn ping_server(client: &MediaServerClient) -> ExitStatus {
    match client.ping().await {
        Ok(body) => {
            info!("Server pinged successfully: {}", body);
            ExitStatus::Success
        }
        Err(e) => {
            error!("Server ping failed: {}. Wrong API key?", e);
            ExitStatus::Error
        }
    }
}

async fn refresh_library(client: &MediaServerClient) -> ExitStatus {
    match client.refresh_library().await {
        Ok(body) => {
            info!("The library refreshed successfully: {}", body);
            ExitStatus::Success
        }
        Err(e) => {
            error!("Library refresh failed: {}", e);
            ExitStatus::Error
        }
    }
}
