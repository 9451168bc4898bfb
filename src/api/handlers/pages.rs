use crate::api::{session::Session, views};
use axum::response::IntoResponse;

// axum handler for GET /
pub async fn home(session: Session) -> impl IntoResponse {
    views::home(session.current())
}

// axum handler for GET /developer
pub async fn developer(session: Session) -> impl IntoResponse {
    views::developer(session.current())
}
