use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Activity;

/// Create an activity either with explicit RFC 3339 begin/end stamps,
/// or with `duration_minutes` for a block that just finished.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateActivityRequest {
    #[validate(length(min = 1, max = 256, message = "Name must be 1-256 characters"))]
    pub name: String,

    #[validate(length(max = 512, message = "Memo too long"))]
    #[serde(default)]
    pub memo: String,

    pub begin: Option<String>,
    pub end: Option<String>,

    #[validate(range(min = 1, max = 1440, message = "Duration must be 1-1440 minutes"))]
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateActivityRequest {
    #[validate(length(min = 1, max = 256, message = "Name must be 1-256 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 512, message = "Memo too long"))]
    pub memo: Option<String>,

    pub begin: Option<String>,
    pub end: Option<String>,
}

/// Date-range filter for the grouped listing; both bounds inclusive.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub days: Vec<DayGroup>,
    pub activity_count: usize,
}
