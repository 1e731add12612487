use clap::{Arg, Command};

pub const ARG_UPSTREAM_URL: &str = "upstream-url";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_UPSTREAM_URL)
            .long(ARG_UPSTREAM_URL)
            .help("Base URL of the assistant-serving API")
            .env("ASISTO_UPSTREAM_URL")
            .required(true),
    )
}
