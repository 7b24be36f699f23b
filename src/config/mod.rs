//! Extension configuration loaded from NZBGet environment variables
//!
//! NZBGet passes extension options as `NZBPO_*` variables, command buttons as
//! `NZBCP_COMMAND` and post-processing parameters as `NZBPP_*`. Everything the
//! notifier needs is read here once; no other module touches the environment.

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const API_KEY: &str = "NZBPO_APIKEY";
pub const HOST: &str = "NZBPO_HOST";
pub const PORT: &str = "NZBPO_PORT";
pub const VERBOSE: &str = "NZBPO_VERBOSE";
pub const TIMEOUT: &str = "NZBPO_TIMEOUT";
pub const COMMAND: &str = "NZBCP_COMMAND";
pub const FINAL_DIR: &str = "NZBPP_FINALDIR";
pub const DIRECTORY: &str = "NZBPP_DIRECTORY";
pub const LOG_FILTER: &str = "RUST_LOG";

/// Options that must be present before anything else happens, in check order.
pub const REQUIRED_OPTIONS: &[&str] = &[API_KEY, HOST, PORT];

/// Length of the `NZBPO_` / `NZBPP_` / `NZBCP_` prefix hidden from users.
const PREFIX_LEN: usize = 6;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Option {name} is missing in configuration file. Please check extension settings.")]
    MissingOption { name: String },

    #[error("Option {name} has invalid value {value:?}: {reason}")]
    InvalidOption {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid media server address {address}: {reason}")]
    InvalidUrl { address: String, reason: String },
}

impl ConfigError {
    fn missing(var: &str) -> Self {
        Self::MissingOption {
            name: display_name(var).to_string(),
        }
    }

    fn invalid(var: &str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name: display_name(var).to_string(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Option name as shown in the NZBGet settings page (`NZBPO_APIKEY` -> `APIKEY`).
pub fn display_name(var: &str) -> &str {
    var.get(PREFIX_LEN..).unwrap_or(var)
}

/// Notifier configuration, immutable for the lifetime of the process
#[derive(Clone)]
pub struct Config {
    /// Media server API token
    pub api_key: String,

    /// Media server hostname or IP
    pub host: String,

    /// Media server port, kept as given by NZBGet
    pub port: String,

    /// Print diagnostic lines
    pub verbose: bool,

    /// Request timeout, `None` waits indefinitely
    pub timeout: Option<Duration>,

    /// Value of the command button that launched us, if any
    pub command: Option<String>,

    /// Final directory after unpack/move, if NZBGet reported one
    pub final_dir: Option<PathBuf>,

    /// Original download directory
    pub directory: Option<PathBuf>,

    /// Extra `tracing` directives for dependencies
    pub log_filter: Option<String>,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var_os(key))
    }

    /// Build the configuration from any key lookup.
    ///
    /// Required options are checked in [REQUIRED_OPTIONS] order and the first
    /// absent one is reported. Only presence is checked, an empty value passes.
    /// Directories are kept as raw OS strings; text options must be UTF-8.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        if let Some(missing) = REQUIRED_OPTIONS.iter().find(|key| lookup(key).is_none()) {
            return Err(ConfigError::missing(missing));
        }

        let required = |key: &str| {
            lookup(key)
                .ok_or_else(|| ConfigError::missing(key))?
                .into_string()
                .map_err(|raw| ConfigError::invalid(key, raw.to_string_lossy(), "not valid UTF-8"))
        };

        let timeout = match lookup(TIMEOUT) {
            Some(raw) => parse_timeout(&raw)?,
            None => Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        };

        Ok(Self {
            api_key: required(API_KEY)?,
            host: required(HOST)?,
            port: required(PORT)?,
            verbose: lookup(VERBOSE).is_some_and(|v| v == "yes"),
            timeout,
            // a non-UTF-8 command can't be "ping"
            command: lookup(COMMAND).and_then(|v| v.into_string().ok()),
            final_dir: lookup(FINAL_DIR).map(PathBuf::from),
            directory: lookup(DIRECTORY).map(PathBuf::from),
            log_filter: lookup(LOG_FILTER).and_then(|v| v.into_string().ok()),
        })
    }

    /// Base URL of the media server, `http://{host}:{port}`
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let address = format!("http://{}:{}", self.host, self.port);
        Url::parse(&address).map_err(|e| ConfigError::InvalidUrl {
            reason: e.to_string(),
            address,
        })
    }

    /// Directory of the finished download.
    ///
    /// A non-empty final directory wins over the original download directory.
    pub fn target_path(&self) -> Result<&Path, ConfigError> {
        self.final_dir
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty())
            .or(self.directory.as_deref())
            .ok_or_else(|| ConfigError::missing(DIRECTORY))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("verbose", &self.verbose)
            .field("timeout", &self.timeout)
            .field("command", &self.command)
            .field("final_dir", &self.final_dir)
            .field("directory", &self.directory)
            .field("log_filter", &self.log_filter)
            .finish()
    }
}

/// Seconds as a whole number; `0` disables the timeout.
fn parse_timeout(raw: &OsString) -> Result<Option<Duration>, ConfigError> {
    let text = raw
        .to_str()
        .ok_or_else(|| ConfigError::invalid(TIMEOUT, raw.to_string_lossy(), "not valid UTF-8"))?;
    let secs: u64 = text
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| ConfigError::invalid(TIMEOUT, text, e.to_string()))?;

    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
