use crate::{
    api::{forms::LoginForm, handlers::run_blocking, session::Session, views},
    store::CredentialStore,
};
use axum::{
    Form,
    extract::Extension,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub const MISSING_FIELDS: &str = "Email and password required.";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";

// axum handler for GET /login
pub async fn form() -> impl IntoResponse {
    views::login(None)
}

// axum handler for POST /login
#[instrument(skip(session, store, form))]
pub async fn submit(
    mut session: Session,
    store: Extension<Arc<CredentialStore>>,
    form: Option<Form<LoginForm>>,
) -> Response {
    let form = form.map(|Form(form)| form).unwrap_or_default();

    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(e) => {
            warn!("Login rejected: {e}");
            return views::login(Some(MISSING_FIELDS)).into_response();
        }
    };

    let store = store.0.clone();
    let result = run_blocking(move || {
        store.authenticate(&credentials.email, &credentials.password)
    })
    .await;

    match result {
        Ok(account) => {
            session.start(account.identifier, account.role);
            (session, Redirect::to("/")).into_response()
        }
        Err(e) => {
            // Unknown account and wrong password get the same response.
            debug!("Login failed: {e}");
            views::login(Some(INVALID_CREDENTIALS)).into_response()
        }
    }
}

// axum handler for GET /logout
pub async fn logout(mut session: Session) -> impl IntoResponse {
    session.clear();
    (session, Redirect::to("/"))
}
