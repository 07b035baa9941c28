//! Goal and subgoal models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Goal state codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalState {
    Open,
    Done,
    Abandoned,
}

impl GoalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalState::Open => "open",
            GoalState::Done => "done",
            GoalState::Abandoned => "abandoned",
        }
    }
}

impl std::str::FromStr for GoalState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(GoalState::Open),
            "done" => Ok(GoalState::Done),
            "abandoned" => Ok(GoalState::Abandoned),
            other => Err(format!("Invalid goal state: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Goal {
    pub goal_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub detail: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub state_code: String,
    pub created_utc: DateTime<Utc>,
}

impl Goal {
    pub fn new(
        user_id: Uuid,
        title: String,
        detail: Option<String>,
        target_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            goal_id: Uuid::new_v4(),
            user_id,
            title,
            detail,
            target_date,
            state_code: GoalState::Open.as_str().to_string(),
            created_utc: Utc::now(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.state_code == GoalState::Open.as_str()
    }
}

/// Ordered step under a goal. Generated by decomposition or edited by
/// the user; `position` orders steps within the goal.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Subgoal {
    pub subgoal_id: Uuid,
    pub goal_id: Uuid,
    pub position: i32,
    pub title: String,
    pub done_flag: bool,
    pub created_utc: DateTime<Utc>,
}

impl Subgoal {
    pub fn new(goal_id: Uuid, position: i32, title: String) -> Self {
        Self {
            subgoal_id: Uuid::new_v4(),
            goal_id,
            position,
            title,
            done_flag: false,
            created_utc: Utc::now(),
        }
    }
}
