//! User model - journal account holders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User entity. `password_hash` never leaves the service; respond with
/// [`UserResponse`] instead.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub newsletter_opt_in: bool,
    pub active_flag: bool,
    pub last_active_utc: DateTime<Utc>,
    pub created_utc: DateTime<Utc>,
}

impl User {
    /// Create a new user with a freshly hashed password.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            user_id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            display_name: None,
            newsletter_opt_in: true,
            active_flag: true,
            last_active_utc: now,
            created_utc: now,
        }
    }

    /// Convert to sanitized response (no credential fields).
    pub fn sanitized(&self) -> UserResponse {
        UserResponse::from(self.clone())
    }
}

/// User response for API (without sensitive fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub newsletter_opt_in: bool,
    pub active_flag: bool,
    pub last_active_utc: DateTime<Utc>,
    pub created_utc: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            user_id: u.user_id,
            username: u.username,
            email: u.email,
            display_name: u.display_name,
            newsletter_opt_in: u.newsletter_opt_in,
            active_flag: u.active_flag,
            last_active_utc: u.last_active_utc,
            created_utc: u.created_utc,
        }
    }
}
