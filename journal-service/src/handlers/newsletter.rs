//! Newsletter self-service dispatch and history.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{
    dtos::newsletter::NewsletterSentResponse, middleware::AuthUser, services::newsletter, AppState,
};

/// Compose and send this week's issue to the caller right now.
pub async fn send(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let record = newsletter::send_to_user(
        &state.db,
        &state.insight,
        &state.quotes,
        &state.email,
        user.user(),
    )
    .await?;

    Ok((
        StatusCode::OK,
        Json(NewsletterSentResponse {
            email_id: record.email_id,
            subject: record.subject,
            sent_utc: record.sent_utc,
        }),
    ))
}

/// Past dispatches for the caller, newest first.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let emails = state.db.find_emails_for_user(user.user().user_id).await?;
    Ok(Json(emails))
}
