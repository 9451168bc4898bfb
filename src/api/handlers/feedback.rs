use crate::{
    api::{forms::FeedbackForm, handlers::run_blocking, session::Session, views},
    store::FeedbackLog,
};
use axum::{Form, Json, extract::Extension, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct FeedbackAck {
    status: String,
    message: String,
}

impl FeedbackAck {
    fn received() -> Self {
        Self {
            status: "success".to_string(),
            message: "Feedback received.".to_string(),
        }
    }
}

// axum handler for GET /feedback
pub async fn form(session: Session) -> impl IntoResponse {
    views::feedback(session.current())
}

#[utoipa::path(
    post,
    path = "/feedback",
    request_body(content = FeedbackForm, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 200, description = "Feedback recorded", body = FeedbackAck, content_type = "application/json"),
    ),
    tag = "feedback"
)]
// axum handler for POST /feedback
#[instrument(skip(log, form))]
pub async fn submit(
    log: Extension<Arc<FeedbackLog>>,
    form: Option<Form<FeedbackForm>>,
) -> impl IntoResponse {
    let record = form.map(|Form(form)| form).unwrap_or_default().into_record();

    let log = log.0.clone();
    // Best effort: the submitter gets the acknowledgment even if the write failed.
    if let Err(e) = run_blocking(move || log.append(&record)).await {
        error!("Error appending feedback: {e}");
    }

    Json(FeedbackAck::received())
}
