//! Activity CRUD and the date-grouped listing.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::activity::{
        CreateActivityRequest, DayGroup, RangeQuery, TimelineResponse, UpdateActivityRequest,
    },
    middleware::AuthUser,
    models::Activity,
    services::timeline,
    utils::ValidatedJson,
    AppState,
};

fn parse_rfc3339(value: &str, field: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid {} timestamp: {}", field, e)))
}

fn check_ordering(begin: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if begin > end {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Activity begin must not be after end"
        )));
    }
    Ok(())
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateActivityRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (begin_utc, end_utc) = match (&req.begin, &req.end, req.duration_minutes) {
        (Some(begin), Some(end), None) => {
            (parse_rfc3339(begin, "begin")?, parse_rfc3339(end, "end")?)
        }
        (None, None, Some(minutes)) => {
            let end = Utc::now();
            (end - Duration::minutes(minutes), end)
        }
        _ => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Provide either begin and end, or duration_minutes"
            )));
        }
    };

    check_ordering(begin_utc, end_utc)?;

    let activity = Activity::new(user.user().user_id, req.name, begin_utc, end_utc, req.memo);
    state.db.insert_activity(&activity).await?;

    tracing::info!(
        user_id = %activity.user_id,
        activity_id = %activity.activity_id,
        "Activity recorded"
    );

    Ok((StatusCode::CREATED, Json(activity)))
}

/// Grouped-by-date listing: every activity beginning inside the range,
/// bucketed by UTC calendar date and ascending by begin time.
pub async fn list_grouped(
    State(state): State<AppState>,
    user: AuthUser,
    Query(range): Query<RangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    if let (Some(from), Some(to)) = (range.from, range.to) {
        if from > to {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "from must not be after to"
            )));
        }
    }

    let from_utc = timeline::day_start(
        range
            .from
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch date")),
    );
    let to_utc = match range.to {
        Some(to) => timeline::day_start(to + Duration::days(1)),
        None => Utc::now() + Duration::days(1),
    };

    let activities = state
        .db
        .find_activities_in_range(user.user().user_id, from_utc, to_utc)
        .await?;

    let tl = timeline::group_by_day(activities);
    let activity_count = timeline::activity_count(&tl);

    let days = tl
        .into_iter()
        .map(|(date, activities)| DayGroup { date, activities })
        .collect();

    Ok(Json(TimelineResponse {
        days,
        activity_count,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(activity_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let activity = state
        .db
        .find_activity(user.user().user_id, activity_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Activity not found")))?;

    Ok(Json(activity))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(activity_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateActivityRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut activity = state
        .db
        .find_activity(user.user().user_id, activity_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Activity not found")))?;

    if let Some(name) = req.name {
        activity.name = name;
    }
    if let Some(memo) = req.memo {
        activity.memo = memo;
    }
    if let Some(begin) = &req.begin {
        activity.begin_utc = parse_rfc3339(begin, "begin")?;
    }
    if let Some(end) = &req.end {
        activity.end_utc = parse_rfc3339(end, "end")?;
    }

    check_ordering(activity.begin_utc, activity.end_utc)?;

    state.db.update_activity(&activity).await?;

    Ok(Json(activity))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(activity_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state
        .db
        .delete_activity(user.user().user_id, activity_id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound(anyhow::anyhow!("Activity not found")));
    }

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Activity deleted" })),
    ))
}
