pub mod auth;
pub mod logging;
pub mod session;
pub mod upstream;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

fn help_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default())
}

// clap wants 'static for --version output
fn long_version() -> &'static str {
    let version = format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH);

    Box::leak(version.into_boxed_str())
}

#[must_use]
pub fn new() -> Command {
    let command = Command::new("asisto")
        .about("Assistant configuration console")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version())
        .color(ColorChoice::Auto)
        .styles(help_styles())
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .env("ASISTO_PORT")
                .help("Port to listen on")
                .default_value("8080")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = auth::with_args(command);
    let command = session::with_args(command);
    let command = upstream::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Vec<&'static str> {
        vec![
            "asisto",
            "--issuer",
            "https://login.example.com/tenant",
            "--client-id",
            "console-client",
            "--client-secret",
            "hunter2",
            "--session-secret",
            "0123456789abcdef",
            "--upstream-url",
            "http://assistants.internal:9000",
        ]
    }

    #[test]
    fn test_command_metadata() {
        let command = new();

        assert_eq!(command.get_name(), "asisto");
        assert_eq!(
            command.get_about().map(ToString::to_string).as_deref(),
            Some("Assistant configuration console")
        );
        assert_eq!(
            command.get_version().map(ToString::to_string).as_deref(),
            Some(env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn test_defaults_apply() {
        let matches = new().get_matches_from(base_args());

        assert_eq!(matches.get_one::<u16>("port").copied(), Some(8080));
        assert_eq!(
            matches.get_one::<String>(auth::ARG_PUBLIC_URL).cloned(),
            Some("http://localhost:8080".to_string())
        );
        assert_eq!(
            matches.get_one::<String>(auth::ARG_ISSUER).cloned(),
            Some("https://login.example.com/tenant".to_string())
        );
    }

    #[test]
    fn test_env_overrides() {
        temp_env::with_vars(
            [
                ("ASISTO_PORT", Some("9090")),
                ("ASISTO_ISSUER", Some("https://login.example.com/tenant")),
                ("ASISTO_CLIENT_ID", Some("console-client")),
                ("ASISTO_CLIENT_SECRET", Some("hunter2")),
                ("ASISTO_SESSION_SECRET", Some("0123456789abcdef")),
                ("ASISTO_PUBLIC_URL", Some("https://console.example.com")),
                ("ASISTO_UPSTREAM_URL", Some("http://assistants.internal:9000")),
                ("ASISTO_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["asisto"]);

                assert_eq!(matches.get_one::<u16>("port").copied(), Some(9090));
                assert_eq!(
                    matches.get_one::<String>(auth::ARG_PUBLIC_URL).cloned(),
                    Some("https://console.example.com".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(upstream::ARG_UPSTREAM_URL).cloned(),
                    Some("http://assistants.internal:9000".to_string())
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_log_level_names_from_env() {
        let pairs = [
            ("error", 0_u8),
            ("warn", 1),
            ("info", 2),
            ("debug", 3),
            ("trace", 4),
        ];

        for (name, expected) in pairs {
            temp_env::with_vars([("ASISTO_LOG_LEVEL", Some(name))], || {
                let matches = new().get_matches_from(base_args());

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(expected)
                );
            });
        }
    }

    #[test]
    fn test_repeated_verbosity_flags() {
        for count in 0_u8..=4 {
            temp_env::with_vars([("ASISTO_LOG_LEVEL", None::<String>)], || {
                let mut args: Vec<String> = base_args().into_iter().map(String::from).collect();

                if count > 0 {
                    args.push(format!("-{}", "v".repeat(usize::from(count))));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(count)
                );
            });
        }
    }

    #[test]
    fn test_missing_required_args() {
        temp_env::with_vars(
            [
                ("ASISTO_ISSUER", None::<&str>),
                ("ASISTO_CLIENT_ID", None::<&str>),
                ("ASISTO_CLIENT_SECRET", None::<&str>),
                ("ASISTO_SESSION_SECRET", None::<&str>),
                ("ASISTO_UPSTREAM_URL", None::<&str>),
            ],
            || {
                let result = new().try_get_matches_from(vec!["asisto"]);

                assert_eq!(
                    result.map(|_| ()).map_err(|e| e.kind()),
                    Err(clap::error::ErrorKind::MissingRequiredArgument)
                );
            },
        );
    }
}
