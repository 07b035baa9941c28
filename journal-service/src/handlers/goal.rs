//! Goal CRUD, LLM decomposition and subgoal completion.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::goal::{CreateGoalRequest, GoalResponse, UpdateGoalRequest, UpdateSubgoalRequest},
    middleware::AuthUser,
    models::{Goal, GoalState, Subgoal},
    utils::ValidatedJson,
    AppState,
};

async fn load_goal_response(state: &AppState, goal: Goal) -> Result<GoalResponse, AppError> {
    let subgoals = state.db.find_subgoals_for_goal(goal.goal_id).await?;
    Ok(GoalResponse { goal, subgoals })
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateGoalRequest>,
) -> Result<impl IntoResponse, AppError> {
    let goal = Goal::new(user.user().user_id, req.title, req.detail, req.target_date);
    state.db.insert_goal(&goal).await?;

    tracing::info!(user_id = %goal.user_id, goal_id = %goal.goal_id, "Goal created");

    Ok((
        StatusCode::CREATED,
        Json(GoalResponse {
            goal,
            subgoals: Vec::new(),
        }),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let goals = state.db.find_goals_for_user(user.user().user_id).await?;

    let mut response = Vec::with_capacity(goals.len());
    for goal in goals {
        response.push(load_goal_response(&state, goal).await?);
    }

    Ok(Json(response))
}

pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(goal_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let goal = state
        .db
        .find_goal(user.user().user_id, goal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Goal not found")))?;

    Ok(Json(load_goal_response(&state, goal).await?))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(goal_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateGoalRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut goal = state
        .db
        .find_goal(user.user().user_id, goal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Goal not found")))?;

    if let Some(title) = req.title {
        goal.title = title;
    }
    if let Some(detail) = req.detail {
        goal.detail = Some(detail);
    }
    if let Some(target_date) = req.target_date {
        goal.target_date = Some(target_date);
    }
    if let Some(state_str) = req.state {
        let parsed: GoalState = state_str
            .parse()
            .map_err(|e: String| AppError::BadRequest(anyhow::anyhow!(e)))?;
        goal.state_code = parsed.as_str().to_string();
    }

    state.db.update_goal(&goal).await?;

    Ok(Json(load_goal_response(&state, goal).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(goal_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.db.delete_goal(user.user().user_id, goal_id).await?;

    if !deleted {
        return Err(AppError::NotFound(anyhow::anyhow!("Goal not found")));
    }

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Goal deleted" })),
    ))
}

/// Ask the model for concrete steps and replace the goal's pending
/// subgoals with them. Completed steps are kept.
pub async fn decompose(
    State(state): State<AppState>,
    user: AuthUser,
    Path(goal_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let goal = state
        .db
        .find_goal(user.user().user_id, goal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Goal not found")))?;

    if !goal.is_open() {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Only open goals can be decomposed"
        )));
    }

    let steps = state.insight.decompose(&goal).await?;

    state.db.delete_pending_subgoals(goal.goal_id).await?;
    let base_position = state.db.max_subgoal_position(goal.goal_id).await?;

    for (offset, title) in steps.iter().enumerate() {
        let subgoal = Subgoal::new(goal.goal_id, base_position + 1 + offset as i32, title.clone());
        state.db.insert_subgoal(&subgoal).await?;
    }

    tracing::info!(
        goal_id = %goal.goal_id,
        step_count = steps.len(),
        "Goal decomposed"
    );

    Ok(Json(load_goal_response(&state, goal).await?))
}

pub async fn update_subgoal(
    State(state): State<AppState>,
    user: AuthUser,
    Path((goal_id, subgoal_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(req): ValidatedJson<UpdateSubgoalRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state
        .db
        .update_subgoal_done(user.user().user_id, goal_id, subgoal_id, req.done)
        .await?;

    if !updated {
        return Err(AppError::NotFound(anyhow::anyhow!("Subgoal not found")));
    }

    let goal = state
        .db
        .find_goal(user.user().user_id, goal_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Goal not found")))?;

    Ok(Json(load_goal_response(&state, goal).await?))
}
