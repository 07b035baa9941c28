//! Request authentication: HTTP Basic or opaque Bearer tokens.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::IntoResponse,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use service_core::error::AppError;

use crate::{
    models::User,
    utils::{self, Password, PasswordHashString},
    AppState,
};

/// Which credential form the request carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Basic,
    Bearer,
}

/// The authenticated caller, stored in request extensions.
#[derive(Clone)]
pub struct AuthSession {
    pub user: User,
    pub scheme: AuthScheme,
}

/// Middleware to require authentication.
///
/// Accepts `Basic <base64 user:pass>` verified against the stored argon2
/// hash, or `Bearer <token>` looked up by SHA-256 digest among
/// non-revoked API tokens. A successful pass refreshes the user's
/// last-active timestamp.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AppError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Missing Authorization header")))?
        .to_string();

    let session = if let Some(encoded) = value.strip_prefix("Basic ") {
        authenticate_basic(&state, encoded).await?
    } else if let Some(token) = value.strip_prefix("Bearer ") {
        authenticate_bearer(&state, token).await?
    } else {
        return Err(AppError::Unauthorized(anyhow::anyhow!(
            "Unsupported authorization scheme"
        )));
    };

    if let Err(e) = state.db.touch_last_active(session.user.user_id).await {
        // Auth already succeeded; a failed touch is not worth a 500.
        tracing::warn!(error = %e, "Failed to refresh last_active_utc");
    }

    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}

/// Split a Basic header payload into (username, password).
fn parse_basic_credentials(encoded: &str) -> Result<(String, String), AppError> {
    let decoded = BASE64
        .decode(encoded.trim())
        .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Invalid Basic credentials")))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Invalid Basic credentials")))?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Invalid Basic credentials")))?;

    Ok((username.to_string(), password.to_string()))
}

async fn authenticate_basic(state: &AppState, encoded: &str) -> Result<AuthSession, AppError> {
    let (username, password) = parse_basic_credentials(encoded)?;

    let user = state
        .db
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Invalid username or password")))?;

    utils::verify_password(
        &Password::new(password),
        &PasswordHashString::new(user.password_hash.clone()),
    )
    .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Invalid username or password")))?;

    Ok(AuthSession {
        user,
        scheme: AuthScheme::Basic,
    })
}

async fn authenticate_bearer(state: &AppState, token: &str) -> Result<AuthSession, AppError> {
    let digest = utils::digest_token(token.trim());

    let api_token = state
        .db
        .find_api_token_by_hash(&digest)
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Invalid or revoked token")))?;

    let user = state
        .db
        .find_user_by_id(api_token.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Invalid or revoked token")))?;

    Ok(AuthSession {
        user,
        scheme: AuthScheme::Bearer,
    })
}

/// Extractor to easily get the authenticated user in handlers.
pub struct AuthUser(pub AuthSession);

impl AuthUser {
    pub fn user(&self) -> &User {
        &self.0.user
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<AuthSession>().cloned().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!("Auth session missing from request extensions"))
        })?;

        Ok(AuthUser(session))
    }
}
