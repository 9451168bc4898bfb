use clap::{Arg, ArgAction, Command};

pub const ARG_SECRET: &str = "secret";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SECRET)
                .long("secret")
                .help("Key used to sign session cookies")
                .long_help(
                    "Key used to sign session cookies. When unset a fixed development key is used and every session can be forged, so always set it in production.",
                )
                .env("AXIS_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long("session-ttl-seconds")
                .help("Session cookie TTL in seconds")
                .env("AXIS_SESSION_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long("cookie-secure")
                .help("Mark the session cookie Secure (HTTPS only)")
                .env("AXIS_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
}
