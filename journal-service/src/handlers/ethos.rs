//! The user's personal ethos statement.

use axum::{extract::State, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{
    dtos::ethos::UpsertEthosRequest, middleware::AuthUser, models::Ethos, utils::ValidatedJson,
    AppState,
};

pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let ethos = state
        .db
        .find_ethos(user.user().user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("No ethos recorded")))?;

    Ok(Json(ethos))
}

pub async fn upsert(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<UpsertEthosRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ethos = Ethos::new(user.user().user_id, req.statement);
    let stored = state.db.upsert_ethos(&ethos).await?;

    Ok(Json(stored))
}
