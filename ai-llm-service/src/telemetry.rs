//! Logging setup shared by the workspace binaries.

use std::io::{self, IsTerminal};

use tracing::Level;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Target prefixes of the workspace crates.
pub const WORKSPACE_TARGETS: &[&str] = &[
    "ai_llm_service",
    "api_index",
    "planner",
    "api",
    "api_planner",
];

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let s = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

fn is_workspace_target(target: &str) -> bool {
    WORKSPACE_TARGETS.iter().any(|p| {
        target == *p
            || target
                .strip_prefix(p)
                .is_some_and(|rest| rest.starts_with("::"))
    })
}

/// Compact fmt layer that renders only events from workspace crates.
///
/// RFC3339 timestamps, `file:line`, span close durations; ANSI only on a TTY.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();
    let only_workspace = filter::filter_fn(|meta| is_workspace_target(meta.target()));

    let format = fmt::format()
        .compact()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    fmt::layer()
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(format)
        .with_filter(only_workspace)
}

/// `EnvFilter` from `RUST_LOG` (or `default`), plus `level` for every workspace crate.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let mut base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let lvl = level.as_str().to_lowercase();
    for target in WORKSPACE_TARGETS {
        if let Ok(d) = format!("{target}={lvl}").parse() {
            base = base.add_directive(d);
        }
    }
    base
}
