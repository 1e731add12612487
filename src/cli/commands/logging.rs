use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Accepted level names, in increasing verbosity.
const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

fn parse_log_level(level: &str) -> Result<u8, String> {
    let lowered = level.to_lowercase();
    if let Some(position) = LEVEL_NAMES.iter().position(|name| *name == lowered) {
        return u8::try_from(position).map_err(|err| err.to_string());
    }

    match lowered.parse::<u8>() {
        Ok(count) if count <= 5 => Ok(count),
        _ => Err("invalid log level".to_string()),
    }
}

#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(parse_log_level)
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("ASISTO_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}
