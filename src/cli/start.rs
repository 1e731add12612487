use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;
use tracing::Level;

/// Tracing level for a `-v` count; `None` keeps the default (errors only).
const fn verbosity_to_level(count: u8) -> Option<Level> {
    match count {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

/// Parse the command line, bring up telemetry, and hand back the action for
/// the binary to execute.
///
/// # Errors
///
/// Returns an error if argument parsing, telemetry initialization, or action dispatch fails
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let verbosity = matches
        .get_one::<u8>(commands::logging::ARG_VERBOSITY)
        .copied()
        .unwrap_or(0);

    telemetry::init(verbosity_to_level(verbosity))?;

    dispatch::handler(&matches)
}
