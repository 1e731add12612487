use clap::{Arg, Command};

pub const ARG_ISSUER: &str = "issuer";
pub const ARG_CLIENT_ID: &str = "client-id";
pub const ARG_CLIENT_SECRET: &str = "client-secret";
pub const ARG_PUBLIC_URL: &str = "public-url";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ISSUER)
                .long(ARG_ISSUER)
                .help("Identity provider tenant base URL, without the /oauth2/v2.0 suffix")
                .env("ASISTO_ISSUER")
                .required(true),
        )
        .arg(
            Arg::new(ARG_CLIENT_ID)
                .long(ARG_CLIENT_ID)
                .help("OAuth2 client id registered for the console")
                .env("ASISTO_CLIENT_ID")
                .required(true),
        )
        .arg(
            Arg::new(ARG_CLIENT_SECRET)
                .long(ARG_CLIENT_SECRET)
                .help("OAuth2 client secret, sent only during the authorization code exchange")
                .env("ASISTO_CLIENT_SECRET")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PUBLIC_URL)
                .long(ARG_PUBLIC_URL)
                .help("Externally reachable base URL, used to build the OAuth2 redirect URI")
                .env("ASISTO_PUBLIC_URL")
                .default_value("http://localhost:8080"),
        )
}
