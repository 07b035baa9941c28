//! Profile management for the authenticated user.

use axum::{extract::State, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{
    dtos::auth::{ChangePasswordRequest, UpdateUserRequest},
    middleware::{AuthScheme, AuthUser},
    utils::{self, Password, PasswordHashString, ValidatedJson},
    AppState,
};

pub async fn get_me(user: AuthUser) -> impl IntoResponse {
    Json(user.user().sanitized())
}

pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut current = user.user().clone();

    if let Some(display_name) = req.display_name {
        current.display_name = Some(display_name);
    }
    if let Some(opt_in) = req.newsletter_opt_in {
        current.newsletter_opt_in = opt_in;
    }

    state
        .db
        .update_user_profile(
            current.user_id,
            current.display_name.as_deref(),
            current.newsletter_opt_in,
        )
        .await?;

    Ok(Json(current.sanitized()))
}

/// Change the account password. Requires Basic authentication so a
/// leaked bearer token cannot take over the account.
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    if user.0.scheme != AuthScheme::Basic {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Password changes require Basic authentication"
        )));
    }

    let current = user.user();

    utils::verify_password(
        &Password::new(req.current_password),
        &PasswordHashString::new(current.password_hash.clone()),
    )
    .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Current password is incorrect")))?;

    let new_hash = utils::hash_password(&Password::new(req.new_password))?;

    state
        .db
        .update_user_password(current.user_id, new_hash.as_str())
        .await?;

    tracing::info!(user_id = %current.user_id, "Password changed");

    Ok(Json(serde_json::json!({ "message": "Password changed" })))
}
