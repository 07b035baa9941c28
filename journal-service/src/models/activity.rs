//! Activity model - a single journaled block of time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Activity {
    pub activity_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub begin_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub memo: String,
    pub created_utc: DateTime<Utc>,
}

impl Activity {
    pub fn new(
        user_id: Uuid,
        name: String,
        begin_utc: DateTime<Utc>,
        end_utc: DateTime<Utc>,
        memo: String,
    ) -> Self {
        Self {
            activity_id: Uuid::new_v4(),
            user_id,
            name,
            begin_utc,
            end_utc,
            memo,
            created_utc: Utc::now(),
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_utc - self.begin_utc).num_minutes()
    }
}
