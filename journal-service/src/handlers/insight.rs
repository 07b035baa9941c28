//! LLM-backed summary and feedback endpoints.

use axum::{extract::State, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{
    dtos::insight::{FeedbackResponse, InsightRangeRequest, SummaryResponse},
    middleware::AuthUser,
    services::timeline::{self, Timeline},
    utils::ValidatedJson,
    AppState,
};

async fn load_timeline(
    state: &AppState,
    user_id: uuid::Uuid,
    req: &InsightRangeRequest,
) -> Result<Timeline, AppError> {
    if req.from > req.to {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "from must not be after to"
        )));
    }

    let (from_utc, to_utc) = timeline::range_bounds(req.from, req.to);
    let activities = state
        .db
        .find_activities_in_range(user_id, from_utc, to_utc)
        .await?;

    Ok(timeline::group_by_day(activities))
}

pub async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<InsightRangeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tl = load_timeline(&state, user.user().user_id, &req).await?;
    let summary = state.insight.summarize(&tl).await?;

    Ok(Json(SummaryResponse {
        from: req.from,
        to: req.to,
        day_count: tl.len(),
        activity_count: timeline::activity_count(&tl),
        summary,
    }))
}

pub async fn feedback(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<InsightRangeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = user.user().user_id;
    let tl = load_timeline(&state, user_id, &req).await?;

    let ethos = state.db.find_ethos(user_id).await?;
    let goals: Vec<_> = state
        .db
        .find_goals_for_user(user_id)
        .await?
        .into_iter()
        .filter(|g| g.is_open())
        .collect();

    let feedback = state
        .insight
        .feedback(&tl, ethos.as_ref().map(|e| e.statement.as_str()), &goals)
        .await?;

    Ok(Json(FeedbackResponse {
        from: req.from,
        to: req.to,
        feedback: feedback.feedback,
        mood: feedback.mood,
    }))
}
