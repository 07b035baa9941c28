pub mod config;
pub mod dtos;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use axum::{
    extract::State,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::JournalConfig;
use crate::services::{Database, EmailProvider, InsightService, QuoteIndex};

#[derive(Clone)]
pub struct AppState {
    pub config: JournalConfig,
    pub db: Database,
    pub insight: InsightService,
    pub email: Arc<dyn EmailProvider>,
    pub quotes: Arc<dyn QuoteIndex>,
}

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/accounts", post(handlers::auth::register))
        .route("/health", get(health_check))
        .route("/metrics", get(handlers::metrics::metrics));

    let authed = Router::new()
        .route(
            "/users/me",
            get(handlers::user::get_me).patch(handlers::user::update_me),
        )
        .route("/users/me/password", post(handlers::user::change_password))
        .route(
            "/auth/tokens",
            post(handlers::auth::create_token).get(handlers::auth::list_tokens),
        )
        .route("/auth/tokens/:token_id", delete(handlers::auth::revoke_token))
        .route(
            "/activities",
            post(handlers::activity::create).get(handlers::activity::list_grouped),
        )
        .route(
            "/activities/:activity_id",
            get(handlers::activity::get)
                .patch(handlers::activity::update)
                .delete(handlers::activity::delete),
        )
        .route(
            "/goals",
            post(handlers::goal::create).get(handlers::goal::list),
        )
        .route(
            "/goals/:goal_id",
            get(handlers::goal::get)
                .patch(handlers::goal::update)
                .delete(handlers::goal::delete),
        )
        .route("/goals/:goal_id/decompose", post(handlers::goal::decompose))
        .route(
            "/goals/:goal_id/subgoals/:subgoal_id",
            patch(handlers::goal::update_subgoal),
        )
        .route(
            "/ethos",
            get(handlers::ethos::get).put(handlers::ethos::upsert),
        )
        .route("/insights/summary", post(handlers::insight::summary))
        .route("/insights/feedback", post(handlers::insight::feedback))
        .route("/newsletters", get(handlers::newsletter::list))
        .route("/newsletters/send", post(handlers::newsletter::send))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(authed)
        .with_state(state.clone())
        .layer(from_fn(middleware::metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(&state.config))
}

fn cors_layer(config: &JournalConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(
            config
                .security
                .allowed_origins
                .iter()
                .map(|o| {
                    o.parse::<axum::http::HeaderValue>().unwrap_or_else(|e| {
                        tracing::error!("Invalid CORS origin '{}': {}. Using fallback.", o, e);
                        axum::http::HeaderValue::from_static("http://localhost:3000")
                    })
                })
                .collect::<Vec<axum::http::HeaderValue>>(),
        )
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ])
}

/// Service health check.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.db.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Database health check failed");
        e
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "checks": {
            "database": "up"
        }
    })))
}
