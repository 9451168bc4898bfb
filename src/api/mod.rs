use crate::store::{CredentialStore, FeedbackLog, JsonFileAccounts, init_data_dir};
use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::get,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    request_id::PropagateRequestIdLayer,
    services::{ServeDir, ServeFile},
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, error, info, info_span};
use ulid::Ulid;
use url::Url;

pub mod forms;
pub(crate) mod handlers;
mod openapi;
pub mod session;
pub mod views;

pub use openapi::openapi;
pub use session::{Session, SessionConfig, SessionUser};

use handlers::{feedback, health, login, pages, signup, sitemap, upcoming};

/// Where static assets live and how the site is reached from outside.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    static_dir: PathBuf,
    public_url: Option<Url>,
}

impl SiteConfig {
    #[must_use]
    pub fn new(static_dir: impl Into<PathBuf>) -> Self {
        Self {
            static_dir: static_dir.into(),
            public_url: None,
        }
    }

    #[must_use]
    pub fn with_public_url(mut self, public_url: Option<Url>) -> Self {
        self.public_url = public_url;
        self
    }

    #[must_use]
    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    #[must_use]
    pub fn public_url(&self) -> Option<&Url> {
        self.public_url.as_ref()
    }
}

/// Shared services handed to every handler through request extensions.
#[derive(Debug, Clone)]
pub struct AppState {
    pub accounts: Arc<CredentialStore>,
    pub feedback: Arc<FeedbackLog>,
    pub session: Arc<SessionConfig>,
    pub site: Arc<SiteConfig>,
}

impl AppState {
    /// Prepare the data directory and open the file-backed stores in it.
    ///
    /// # Errors
    /// Returns an error if the data directory or its files cannot be created.
    pub fn open(data_dir: &Path, session: SessionConfig, site: SiteConfig) -> Result<Self> {
        let paths = init_data_dir(data_dir)
            .with_context(|| format!("Failed to prepare data directory {}", data_dir.display()))?;

        Ok(Self {
            accounts: Arc::new(CredentialStore::new(JsonFileAccounts::new(paths.users))),
            feedback: Arc::new(FeedbackLog::new(paths.feedback)),
            session: Arc::new(session),
            site: Arc::new(site),
        })
    }
}

/// Build the application router with all routes and shared services.
pub fn router(state: &AppState) -> Router {
    let static_dir = state.site.static_dir();

    Router::new()
        .route("/", get(pages::home))
        .route("/signup", get(signup::form).post(signup::submit))
        .route("/login", get(login::form).post(login::submit))
        .route("/logout", get(login::logout))
        .route("/feedback", get(feedback::form).post(feedback::submit))
        .route("/developer", get(pages::developer))
        .route("/sitemap.xml", get(sitemap::sitemap))
        .route("/api/upcoming-ai", get(upcoming::upcoming_ai))
        .route("/health", get(health::health))
        .route_service("/robots.txt", ServeFile::new(static_dir.join("robots.txt")))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(Extension(state.accounts.clone()))
        .layer(Extension(state.feedback.clone()))
        .layer(Extension(state.session.clone()))
        .layer(Extension(state.site.clone()))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, state: AppState) -> Result<()> {
    let app = router(&state).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(CompressionLayer::new()),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}
