//! Logging setup for the sclam2d binaries
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the application. This module provides the one the bundled binary uses.

use tracing::Level;

/// Install the standard subscriber with INFO as the default level.
///
/// Format: `[LEVEL YYYY-MM-DD HH:MM:SS module] message` for INFO/WARN/ERROR,
/// `[LEVEL YYYY-MM-DD HH:MM:SS file:line] message` for DEBUG/TRACE.
///
/// # Example
/// ```no_run
/// use sclam2d::init_logger;
///
/// init_logger();
/// tracing::info!("Evaluating graph");
/// ```
///
/// `RUST_LOG` overrides the default level:
/// ```bash
/// RUST_LOG=debug cargo run --bin evaluate_calibration_graph -- graph.txt
/// RUST_LOG=sclam2d::core::graph=debug cargo run --bin evaluate_calibration_graph -- graph.txt
/// ```
pub fn init_logger() {
    init_logger_with_level(Level::INFO)
}

/// Install the standard subscriber with a custom default level.
///
/// Does nothing if a global subscriber is already installed.
///
/// # Example
/// ```no_run
/// use sclam2d::init_logger_with_level;
/// use tracing::Level;
///
/// init_logger_with_level(Level::DEBUG);
/// tracing::debug!("bootstrap details enabled");
/// ```
pub fn init_logger_with_level(default_level: Level) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .event_format(BracketFormatter)
        .try_init()
        .is_ok();
    if !installed {
        tracing::debug!("global subscriber already installed, keeping it");
    }
}

/// Colored level label.
fn level_label(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[31mERROR\x1b[0m",
        Level::WARN => "\x1b[33mWARN\x1b[0m",
        Level::INFO => "\x1b[32mINFO\x1b[0m",
        Level::DEBUG => "\x1b[34mDEBUG\x1b[0m",
        Level::TRACE => "\x1b[35mTRACE\x1b[0m",
    }
}

/// Module path without the crate name, e.g. `edges::info3`.
fn short_target(target: &str) -> &str {
    target
        .strip_prefix("sclam2d::")
        .unwrap_or(target)
}

struct BracketFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for BracketFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let level = metadata.level();

        write!(
            writer,
            "[{} {} ",
            level_label(level),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;

        let source_location = matches!(*level, Level::DEBUG | Level::TRACE)
            .then(|| metadata.file().zip(metadata.line()))
            .flatten();
        match source_location {
            Some((file, line)) => {
                let filename = file.rsplit('/').next().unwrap_or(file);
                write!(writer, "{filename}:{line}")?;
            }
            None => write!(writer, "{}", short_target(metadata.target()))?,
        }

        write!(writer, "] ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
