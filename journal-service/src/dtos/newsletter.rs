use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct NewsletterSentResponse {
    pub email_id: Uuid,
    pub subject: String,
    pub sent_utc: DateTime<Utc>,
}
