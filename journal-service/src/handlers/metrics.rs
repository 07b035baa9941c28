use axum::{http::StatusCode, response::IntoResponse};

use crate::services::metrics::get_metrics;

pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
