pub mod logging;
pub mod session;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;
use url::Url;

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("axis")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("AXIS_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("data-dir")
                .short('d')
                .long("data-dir")
                .help("Directory holding users.json and feedback.json")
                .default_value("data")
                .env("AXIS_DATA_DIR")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("static-dir")
                .long("static-dir")
                .help("Directory served under /static, also holds robots.txt")
                .default_value("static")
                .env("AXIS_STATIC_DIR")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("public-url")
                .long("public-url")
                .help("Public base URL used in the sitemap, example: https://axis.example")
                .long_help(
                    "Public base URL used in the sitemap. When unset the URL is rebuilt from the request Host and X-Forwarded-Proto headers.",
                )
                .env("AXIS_PUBLIC_URL")
                .value_parser(|value: &str| Url::parse(value)),
        );

    let command = session::with_args(command);
    logging::with_args(command)
}
