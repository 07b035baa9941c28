use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Inclusive date range over which to run an insight.
#[derive(Debug, Deserialize, Validate)]
pub struct InsightRangeRequest {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub day_count: usize,
    pub activity_count: usize,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub feedback: String,
    pub mood: String,
}
