//! Account creation and API token management.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::auth::{CreateTokenRequest, MintedTokenResponse, RegisterRequest},
    middleware::AuthUser,
    models::{ApiToken, ApiTokenResponse, User},
    utils::{self, Password, ValidatedJson},
    AppState,
};

/// Create a new account.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if state
        .db
        .find_user_by_username(&req.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(anyhow::anyhow!("Username already taken")));
    }

    if state.db.find_user_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Email already registered"
        )));
    }

    let hash = utils::hash_password(&Password::new(req.password))?;

    let mut user = User::new(req.username, req.email, hash.into_string());
    user.display_name = req.display_name;

    state.db.insert_user(&user).await?;

    tracing::info!(user_id = %user.user_id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(user.sanitized())))
}

/// Mint a bearer token. The plaintext is returned exactly once.
pub async fn create_token(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (plaintext, digest) = utils::generate_token();
    let token = ApiToken::new(user.user().user_id, digest, req.label);

    state.db.insert_api_token(&token).await?;

    tracing::info!(user_id = %token.user_id, token_id = %token.token_id, "API token minted");

    Ok((
        StatusCode::CREATED,
        Json(MintedTokenResponse {
            token_id: token.token_id,
            token: plaintext,
            label: token.label,
            created_utc: token.created_utc,
        }),
    ))
}

/// List token metadata for the caller.
pub async fn list_tokens(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let tokens = state
        .db
        .find_api_tokens_for_user(user.user().user_id)
        .await?;

    let response: Vec<ApiTokenResponse> = tokens.into_iter().map(ApiTokenResponse::from).collect();
    Ok(Json(response))
}

/// Revoke one of the caller's tokens.
pub async fn revoke_token(
    State(state): State<AppState>,
    user: AuthUser,
    Path(token_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let revoked = state
        .db
        .revoke_api_token(user.user().user_id, token_id)
        .await?;

    if !revoked {
        return Err(AppError::NotFound(anyhow::anyhow!("Token not found")));
    }

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Token revoked" })),
    ))
}
