//! Ethos model - one personal mission statement per user.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Ethos {
    pub ethos_id: Uuid,
    pub user_id: Uuid,
    pub statement: String,
    pub updated_utc: DateTime<Utc>,
}

impl Ethos {
    pub fn new(user_id: Uuid, statement: String) -> Self {
        Self {
            ethos_id: Uuid::new_v4(),
            user_id,
            statement,
            updated_utc: Utc::now(),
        }
    }
}
