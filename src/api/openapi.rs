use super::{
    forms::FeedbackForm,
    handlers::{
        feedback::{self, FeedbackAck},
        health::{self, Health},
        upcoming::{self, UpcomingFeatures},
    },
};
use utoipa::OpenApi;

/// Document for the machine-facing endpoints. HTML pages are not included.
#[derive(OpenApi)]
#[openapi(
    paths(feedback::submit, upcoming::upcoming_ai, health::health),
    components(schemas(FeedbackForm, FeedbackAck, UpcomingFeatures, Health)),
    tags(
        (name = "feedback", description = "Feedback submissions"),
        (name = "features", description = "Planned feature list"),
        (name = "health", description = "Service health")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    // Use Cargo.toml metadata instead of the utoipa defaults.
    doc.info.title = env!("CARGO_PKG_NAME").to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc.info.description = Some(env!("CARGO_PKG_DESCRIPTION").to_string());
    doc
}
