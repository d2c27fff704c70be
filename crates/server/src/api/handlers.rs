use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}

/// Renders the cached text for `id` through the page template.
///
/// Any failure to read the text, a miss or a store error alike, answers 200
/// with an empty body.
pub async fn render_text(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let text = match state.cache().get_text(&id).await {
        Ok(text) => text,
        Err(e) => {
            if e.is_not_found() {
                debug!(request_id = %id, "No cached text");
            } else {
                error!(request_id = %id, error = %e, "Failed to read cached text");
            }
            return Html(String::new()).into_response();
        }
    };

    match state.template().render(&text) {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            error!(request_id = %id, error = %e, "Failed to render page");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
