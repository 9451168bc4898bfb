use crate::{
    api::{forms::SignupForm, handlers::run_blocking, session::Session, views},
    store::{CredentialStore, StoreError},
};
use axum::{
    Form,
    extract::Extension,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{error, instrument, warn};

pub const MISSING_FIELDS: &str = "Email and password required.";
pub const ACCOUNT_EXISTS: &str = "Account already exists.";
pub const STORAGE_UNAVAILABLE: &str = "Account storage unavailable.";

// axum handler for GET /signup
pub async fn form() -> impl IntoResponse {
    views::signup(None)
}

// axum handler for POST /signup
#[instrument(skip(session, store, form))]
pub async fn submit(
    mut session: Session,
    store: Extension<Arc<CredentialStore>>,
    form: Option<Form<SignupForm>>,
) -> Response {
    let form = form.map(|Form(form)| form).unwrap_or_default();

    let signup = match form.validate() {
        Ok(signup) => signup,
        Err(e) => {
            warn!("Signup rejected: {e}");
            return views::signup(Some(MISSING_FIELDS)).into_response();
        }
    };

    let store = store.0.clone();
    let result = run_blocking(move || {
        store.create_account(
            &signup.credentials.email,
            &signup.credentials.password,
            &signup.role,
        )
    })
    .await;

    match result {
        Ok(account) => {
            session.start(account.identifier, account.role);
            (session, Redirect::to("/")).into_response()
        }
        Err(StoreError::DuplicateAccount) => views::signup(Some(ACCOUNT_EXISTS)).into_response(),
        Err(StoreError::MissingField(_)) => views::signup(Some(MISSING_FIELDS)).into_response(),
        Err(e) => {
            error!("Error creating account: {e}");
            views::signup(Some(STORAGE_UNAVAILABLE)).into_response()
        }
    }
}
