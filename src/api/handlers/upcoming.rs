use axum::{Json, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const UPCOMING_FEATURES: [&str; 4] = [
    "AI-powered ride scheduling",
    "Voice booking assistant",
    "Predictive wait time analytics",
    "Driver heatmaps and routing optimization",
];

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UpcomingFeatures {
    features: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/api/upcoming-ai",
    responses (
        (status = 200, description = "Planned features", body = UpcomingFeatures, content_type = "application/json"),
    ),
    tag = "features"
)]
// axum handler for GET /api/upcoming-ai
pub async fn upcoming_ai() -> impl IntoResponse {
    Json(UpcomingFeatures {
        features: UPCOMING_FEATURES.iter().map(ToString::to_string).collect(),
    })
}
