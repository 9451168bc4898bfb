use crate::api::{self, AppState, SessionConfig, SiteConfig, session::DEV_SECRET};
use anyhow::Result;
use secrecy::SecretString;
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
    pub public_url: Option<Url>,
    pub secret: Option<SecretString>,
    pub session_ttl_seconds: i64,
    pub cookie_secure: bool,
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        let secret = self.secret.clone().unwrap_or_else(|| {
            warn!("No session secret configured, using the development key; set AXIS_SECRET");
            SecretString::from(DEV_SECRET.to_string())
        });

        SessionConfig::new(secret)
            .with_ttl_seconds(self.session_ttl_seconds)
            .with_cookie_secure(self.cookie_secure)
    }

    fn site_config(&self) -> SiteConfig {
        SiteConfig::new(&self.static_dir).with_public_url(self.public_url.clone())
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the data directory cannot be prepared or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let state = AppState::open(&args.data_dir, args.session_config(), args.site_config())?;

    api::new(args.port, state).await
}

fn log_startup_args(args: &Args) {
    info!(
        port = args.port,
        data_dir = %args.data_dir.display(),
        static_dir = %args.static_dir.display(),
        public_url = args.public_url.as_ref().map_or("-", Url::as_str),
        session_ttl_seconds = args.session_ttl_seconds,
        cookie_secure = args.cookie_secure,
        "Starting axis"
    );
}
