//! Email dispatch records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    Newsletter,
    Summary,
}

impl EmailKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailKind::Newsletter => "newsletter",
            EmailKind::Summary => "summary",
        }
    }
}

/// Append-only record of an outbound email.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EmailRecord {
    pub email_id: Uuid,
    pub user_id: Uuid,
    pub kind_code: String,
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,
    pub sent_utc: DateTime<Utc>,
}

impl EmailRecord {
    pub fn new(
        user_id: Uuid,
        kind: EmailKind,
        subject: String,
        body_text: String,
        body_html: Option<String>,
    ) -> Self {
        Self {
            email_id: Uuid::new_v4(),
            user_id,
            kind_code: kind.as_str().to_string(),
            subject,
            body_text,
            body_html,
            sent_utc: Utc::now(),
        }
    }
}
