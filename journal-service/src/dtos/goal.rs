use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Goal, Subgoal};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, max = 256, message = "Title must be 1-256 characters"))]
    pub title: String,

    pub detail: Option<String>,
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGoalRequest {
    #[validate(length(min = 1, max = 256, message = "Title must be 1-256 characters"))]
    pub title: Option<String>,

    pub detail: Option<String>,
    pub target_date: Option<NaiveDate>,

    /// One of "open", "done", "abandoned".
    pub state: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSubgoalRequest {
    pub done: bool,
}

#[derive(Debug, Serialize)]
pub struct GoalResponse {
    #[serde(flatten)]
    pub goal: Goal,
    pub subgoals: Vec<Subgoal>,
}
