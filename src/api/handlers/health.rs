use crate::{
    GIT_COMMIT_HASH,
    api::handlers::run_blocking,
    store::{CredentialStore, FeedbackLog},
};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    accounts: String,
    feedback: String,
}

const fn status(ok: bool) -> &'static str {
    if ok { "ok" } else { "error" }
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Account store and feedback log are usable", body = Health),
        (status = 503, description = "Account store or feedback log is unusable", body = Health)
    ),
    tag= "health"
)]
// axum handler for health
pub async fn health(
    method: Method,
    store: Extension<Arc<CredentialStore>>,
    log: Extension<Arc<FeedbackLog>>,
) -> impl IntoResponse {
    let store = store.0.clone();
    let accounts_ok = match run_blocking(move || store.check()).await {
        Ok(()) => true,
        Err(e) => {
            error!("Account store check failed: {e}");
            false
        }
    };

    let feedback_ok = log.path().is_file();
    if !feedback_ok {
        error!("Feedback log missing: {}", log.path().display());
    }

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        accounts: status(accounts_ok).to_string(),
        feedback: status(feedback_ok).to_string(),
    };

    let body = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };

    let short_hash = if health.commit.len() > 7 {
        &health.commit[0..7]
    } else {
        ""
    };

    let headers = format!("{}:{}:{}", health.name, health.version, short_hash)
        .parse::<HeaderValue>()
        .map(|x_app_header_value| {
            debug!("X-App header: {:?}", x_app_header_value);

            let mut headers = HeaderMap::new();

            headers.insert("X-App", x_app_header_value);

            headers
        })
        .map_err(|err| {
            error!("Failed to parse X-App header: {}", err);
        });

    let headers = headers.unwrap_or_else(|()| HeaderMap::new());

    if accounts_ok && feedback_ok {
        (StatusCode::OK, headers, body)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, headers, body)
    }
}
