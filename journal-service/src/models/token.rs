//! API token model - opaque bearer credentials, stored as SHA-256 digests.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct ApiToken {
    pub token_id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub label: String,
    pub created_utc: DateTime<Utc>,
    pub revoked_utc: Option<DateTime<Utc>>,
}

impl ApiToken {
    pub fn new(user_id: Uuid, token_hash: String, label: String) -> Self {
        Self {
            token_id: Uuid::new_v4(),
            user_id,
            token_hash,
            label,
            created_utc: Utc::now(),
            revoked_utc: None,
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_utc.is_some()
    }
}

/// Token metadata for listings. The secret itself is only returned once,
/// at mint time.
#[derive(Debug, Clone, Serialize)]
pub struct ApiTokenResponse {
    pub token_id: Uuid,
    pub label: String,
    pub created_utc: DateTime<Utc>,
    pub revoked_utc: Option<DateTime<Utc>>,
}

impl From<ApiToken> for ApiTokenResponse {
    fn from(t: ApiToken) -> Self {
        Self {
            token_id: t.token_id,
            label: t.label,
            created_utc: t.created_utc,
            revoked_utc: t.revoked_utc,
        }
    }
}
