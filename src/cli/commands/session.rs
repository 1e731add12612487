use clap::{Arg, Command};

pub const ARG_SESSION_SECRET: &str = "session-secret";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_SESSION_SECRET)
            .long(ARG_SESSION_SECRET)
            .help("Key used to sign session cookies; rotating it signs everyone out")
            .env("ASISTO_SESSION_SECRET")
            .required(true),
    )
}
