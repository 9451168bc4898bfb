use crate::cli::{
    actions::{Action, server::Args},
    commands::session,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;
use url::Url;

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let data_dir = matches
        .get_one::<PathBuf>("data-dir")
        .cloned()
        .context("missing required argument: --data-dir")?;
    let static_dir = matches
        .get_one::<PathBuf>("static-dir")
        .cloned()
        .context("missing required argument: --static-dir")?;
    let public_url = matches.get_one::<Url>("public-url").cloned();

    let secret = matches
        .get_one::<String>(session::ARG_SECRET)
        .filter(|secret| !secret.is_empty())
        .map(|secret| SecretString::from(secret.clone()));
    let session_ttl_seconds = matches
        .get_one::<i64>(session::ARG_SESSION_TTL_SECONDS)
        .copied()
        .context("missing required argument: --session-ttl-seconds")?;
    let cookie_secure = matches.get_flag(session::ARG_COOKIE_SECURE);

    Ok(Action::Server(Args {
        port,
        data_dir,
        static_dir,
        public_url,
        secret,
        session_ttl_seconds,
        cookie_secure,
    }))
}
