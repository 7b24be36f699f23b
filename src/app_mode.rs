//! Run modes: connectivity check or post-processing refresh.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Manual "Test connection" button in the NZBGet settings page
    Ping,
    /// Regular post-processing run after a download completes
    Refresh,
}

impl RunMode {
    /// Mode selected by the `NZBCP_COMMAND` value. Only the exact string
    /// `ping` is recognised, anything else is a normal refresh.
    pub fn from_command(command: Option<&str>) -> Self {
        match command {
            Some("ping") => RunMode::Ping,
            _ => RunMode::Refresh,
        }
    }
}
