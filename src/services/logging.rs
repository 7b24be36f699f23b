//! Console logging in the NZBGet extension line format.
//!
//! NZBGet reads an extension's stdout and classifies each line by its prefix
//! (`[INFO]`, `[WARNING]`, `[ERROR]`). All output goes through `tracing`; this
//! module provides the event formatter and the subscriber setup used by main.

use std::fmt;

use anyhow::{Result, anyhow};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Line prefix NZBGet understands for a tracing level.
///
/// Debug and trace events are verbose diagnostics and are shown as `[INFO]`.
pub fn line_prefix(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "[ERROR]",
        Level::WARN => "[WARNING]",
        _ => "[INFO]",
    }
}

/// Formats events as `[LEVEL] message key=value`
#[derive(Debug, Clone, Copy, Default)]
pub struct NzbgetFormat;

impl<S, N> FormatEvent<S, N> for NzbgetFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "{} ", line_prefix(event.metadata().level()))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Target prefix of every event this crate emits.
const CRATE_TARGET: &str = "mediaserver_notify";

/// Build the event filter.
///
/// Our own lines are always shown at `info` (`debug` when verbose). Extra
/// directives, usually from `RUST_LOG`, can tune dependencies but never
/// silence or re-level this crate.
pub fn build_filter(verbose: bool, extra: Option<&str>) -> EnvFilter {
    let mut filter = EnvFilter::new("warn");

    for raw in extra.unwrap_or_default().split(',').map(str::trim) {
        if raw.is_empty() || raw.starts_with(CRATE_TARGET) {
            continue;
        }
        if let Ok(directive) = raw.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }

    let level = if verbose { "debug" } else { "info" };
    match format!("{CRATE_TARGET}={level}").parse::<Directive>() {
        Ok(own) => filter.add_directive(own),
        Err(_) => filter,
    }
}

/// Install the global subscriber writing NZBGet lines to stdout.
pub fn init(verbose: bool, extra: Option<&str>) -> Result<()> {
    tracing_subscriber::fmt()
        .event_format(NzbgetFormat)
        .with_env_filter(build_filter(verbose, extra))
        .with_writer(std::io::stdout)
        .try_init()
        .map_err(|e| anyhow!("failed to initialise logging: {e}"))
}
