//! mediaserver-notify - NZBGet post-processing hook for Jellyfin/Emby
//!
//! NZBGet reads the exit code: 93 success, 94 error.

use std::process::ExitCode;

use tracing::error;

use mediaserver_notify::services::logging;
use mediaserver_notify::{Config, ExitStatus, run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Optional .env for running the hook by hand; NZBGet provides the real values
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    let (verbose, log_filter) = match &config {
        Ok(config) => (config.verbose, config.log_filter.as_deref()),
        Err(_) => (false, None),
    };
    if let Err(e) = logging::init(verbose, log_filter) {
        eprintln!("[ERROR] {e:#}");
        return ExitStatus::Error.into();
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitStatus::Error.into();
        }
    };

    run(&config).await.into()
}
