//! PostgreSQL database service for the journal backend.
//!
//! One method per query; runtime-checked sqlx with positional binds.

use chrono::{DateTime, Utc};
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::models::{Activity, ApiToken, EmailRecord, Ethos, Goal, Subgoal, User};

/// PostgreSQL database wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database wrapper from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using the service configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(Self::new(pool))
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    /// Health check - ping the database.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Database health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!("Database health check failed: {}", e))
            })?;
        Ok(())
    }

    // ==================== User Operations ====================

    /// Insert a new user.
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, email, password_hash, display_name, newsletter_opt_in, active_flag, last_active_utc, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.user_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.newsletter_opt_in)
        .bind(user.active_flag)
        .bind(user.last_active_utc)
        .bind(user.created_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    /// Find user by ID.
    pub async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    /// Find user by username (case-insensitive).
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    /// Find user by email (case-insensitive).
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    /// Update profile fields.
    pub async fn update_user_profile(
        &self,
        user_id: Uuid,
        display_name: Option<&str>,
        newsletter_opt_in: bool,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET display_name = $1, newsletter_opt_in = $2 WHERE user_id = $3")
            .bind(display_name)
            .bind(newsletter_opt_in)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    /// Replace the stored password hash.
    pub async fn update_user_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE user_id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    /// Refresh last-seen timestamp after successful authentication.
    pub async fn touch_last_active(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_active_utc = NOW() WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    /// Users that should receive the newsletter batch.
    pub async fn find_newsletter_recipients(&self) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE active_flag = true AND newsletter_opt_in = true ORDER BY created_utc",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    /// Recompute active flags from the last-seen cutoff, both directions.
    /// Returns (activated, deactivated) row counts.
    pub async fn refresh_active_flags(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<(u64, u64), AppError> {
        let activated = sqlx::query(
            "UPDATE users SET active_flag = true WHERE active_flag = false AND last_active_utc > $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?
        .rows_affected();

        let deactivated = sqlx::query(
            "UPDATE users SET active_flag = false WHERE active_flag = true AND last_active_utc <= $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?
        .rows_affected();

        Ok((activated, deactivated))
    }

    // ==================== API Token Operations ====================

    /// Insert a new API token.
    pub async fn insert_api_token(&self, token: &ApiToken) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO api_tokens (token_id, user_id, token_hash, label, created_utc, revoked_utc)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(token.token_id)
        .bind(token.user_id)
        .bind(&token.token_hash)
        .bind(&token.label)
        .bind(token.created_utc)
        .bind(token.revoked_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    /// Find a live token by its digest.
    pub async fn find_api_token_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<ApiToken>, AppError> {
        sqlx::query_as::<_, ApiToken>(
            "SELECT * FROM api_tokens WHERE token_hash = $1 AND revoked_utc IS NULL",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    /// All tokens minted by a user, newest first.
    pub async fn find_api_tokens_for_user(&self, user_id: Uuid) -> Result<Vec<ApiToken>, AppError> {
        sqlx::query_as::<_, ApiToken>(
            "SELECT * FROM api_tokens WHERE user_id = $1 ORDER BY created_utc DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    /// Revoke a token. Returns false when the token does not exist or
    /// belongs to another user.
    pub async fn revoke_api_token(&self, user_id: Uuid, token_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE api_tokens SET revoked_utc = NOW() WHERE token_id = $1 AND user_id = $2 AND revoked_utc IS NULL",
        )
        .bind(token_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== Activity Operations ====================

    /// Insert a new activity.
    pub async fn insert_activity(&self, activity: &Activity) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO activities (activity_id, user_id, name, begin_utc, end_utc, memo, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(activity.activity_id)
        .bind(activity.user_id)
        .bind(&activity.name)
        .bind(activity.begin_utc)
        .bind(activity.end_utc)
        .bind(&activity.memo)
        .bind(activity.created_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    /// Find one activity scoped to its owner.
    pub async fn find_activity(
        &self,
        user_id: Uuid,
        activity_id: Uuid,
    ) -> Result<Option<Activity>, AppError> {
        sqlx::query_as::<_, Activity>(
            "SELECT * FROM activities WHERE activity_id = $1 AND user_id = $2",
        )
        .bind(activity_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    /// Activities beginning inside [from, to), ascending by begin time.
    pub async fn find_activities_in_range(
        &self,
        user_id: Uuid,
        from_utc: DateTime<Utc>,
        to_utc: DateTime<Utc>,
    ) -> Result<Vec<Activity>, AppError> {
        sqlx::query_as::<_, Activity>(
            r#"
            SELECT * FROM activities
            WHERE user_id = $1 AND begin_utc >= $2 AND begin_utc < $3
            ORDER BY begin_utc, activity_id
            "#,
        )
        .bind(user_id)
        .bind(from_utc)
        .bind(to_utc)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    /// Update name, timestamps and memo of an existing activity.
    pub async fn update_activity(&self, activity: &Activity) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE activities SET name = $1, begin_utc = $2, end_utc = $3, memo = $4
            WHERE activity_id = $5 AND user_id = $6
            "#,
        )
        .bind(&activity.name)
        .bind(activity.begin_utc)
        .bind(activity.end_utc)
        .bind(&activity.memo)
        .bind(activity.activity_id)
        .bind(activity.user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    /// Delete an activity. Returns false when nothing matched.
    pub async fn delete_activity(&self, user_id: Uuid, activity_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM activities WHERE activity_id = $1 AND user_id = $2")
            .bind(activity_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== Goal Operations ====================

    /// Insert a new goal.
    pub async fn insert_goal(&self, goal: &Goal) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO goals (goal_id, user_id, title, detail, target_date, state_code, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(goal.goal_id)
        .bind(goal.user_id)
        .bind(&goal.title)
        .bind(&goal.detail)
        .bind(goal.target_date)
        .bind(&goal.state_code)
        .bind(goal.created_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    /// Find one goal scoped to its owner.
    pub async fn find_goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<Option<Goal>, AppError> {
        sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE goal_id = $1 AND user_id = $2")
            .bind(goal_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    /// All goals for a user, oldest first.
    pub async fn find_goals_for_user(&self, user_id: Uuid) -> Result<Vec<Goal>, AppError> {
        sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE user_id = $1 ORDER BY created_utc")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    /// Update title, detail, target date and state of a goal.
    pub async fn update_goal(&self, goal: &Goal) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE goals SET title = $1, detail = $2, target_date = $3, state_code = $4
            WHERE goal_id = $5 AND user_id = $6
            "#,
        )
        .bind(&goal.title)
        .bind(&goal.detail)
        .bind(goal.target_date)
        .bind(&goal.state_code)
        .bind(goal.goal_id)
        .bind(goal.user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    /// Delete a goal (subgoals cascade). Returns false when nothing matched.
    pub async fn delete_goal(&self, user_id: Uuid, goal_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM goals WHERE goal_id = $1 AND user_id = $2")
            .bind(goal_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== Subgoal Operations ====================

    /// Insert a new subgoal.
    pub async fn insert_subgoal(&self, subgoal: &Subgoal) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO subgoals (subgoal_id, goal_id, position, title, done_flag, created_utc)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(subgoal.subgoal_id)
        .bind(subgoal.goal_id)
        .bind(subgoal.position)
        .bind(&subgoal.title)
        .bind(subgoal.done_flag)
        .bind(subgoal.created_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    /// Subgoals of a goal in step order.
    pub async fn find_subgoals_for_goal(&self, goal_id: Uuid) -> Result<Vec<Subgoal>, AppError> {
        sqlx::query_as::<_, Subgoal>(
            "SELECT * FROM subgoals WHERE goal_id = $1 ORDER BY position, created_utc",
        )
        .bind(goal_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    /// Remove not-yet-done subgoals before regenerating a decomposition.
    pub async fn delete_pending_subgoals(&self, goal_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM subgoals WHERE goal_id = $1 AND done_flag = false")
            .bind(goal_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(result.rows_affected())
    }

    /// Highest position currently used under a goal (0 when empty).
    pub async fn max_subgoal_position(&self, goal_id: Uuid) -> Result<i32, AppError> {
        let row: (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(position), 0) FROM subgoals WHERE goal_id = $1")
                .bind(goal_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(row.0)
    }

    /// Flip a subgoal's done flag. Ownership is checked through the goal.
    pub async fn update_subgoal_done(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        subgoal_id: Uuid,
        done: bool,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE subgoals s SET done_flag = $1
            FROM goals g
            WHERE s.subgoal_id = $2 AND s.goal_id = $3
              AND g.goal_id = s.goal_id AND g.user_id = $4
            "#,
        )
        .bind(done)
        .bind(subgoal_id)
        .bind(goal_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(result.rows_affected() > 0)
    }

    /// Done/total subgoal counts across a user's open goals.
    pub async fn count_subgoal_progress(&self, user_id: Uuid) -> Result<(i64, i64), AppError> {
        let row: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE s.done_flag), COUNT(*)
            FROM subgoals s
            JOIN goals g ON g.goal_id = s.goal_id
            WHERE g.user_id = $1 AND g.state_code = 'open'
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(row)
    }

    // ==================== Ethos Operations ====================

    /// Insert or replace the user's ethos statement.
    pub async fn upsert_ethos(&self, ethos: &Ethos) -> Result<Ethos, AppError> {
        sqlx::query_as::<_, Ethos>(
            r#"
            INSERT INTO ethos (ethos_id, user_id, statement, updated_utc)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id)
            DO UPDATE SET statement = EXCLUDED.statement, updated_utc = EXCLUDED.updated_utc
            RETURNING *
            "#,
        )
        .bind(ethos.ethos_id)
        .bind(ethos.user_id)
        .bind(&ethos.statement)
        .bind(ethos.updated_utc)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    /// Find the user's ethos statement.
    pub async fn find_ethos(&self, user_id: Uuid) -> Result<Option<Ethos>, AppError> {
        sqlx::query_as::<_, Ethos>("SELECT * FROM ethos WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    // ==================== Email Operations ====================

    /// Record an outbound email.
    pub async fn insert_email(&self, email: &EmailRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO emails (email_id, user_id, kind_code, subject, body_text, body_html, sent_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(email.email_id)
        .bind(email.user_id)
        .bind(&email.kind_code)
        .bind(&email.subject)
        .bind(&email.body_text)
        .bind(&email.body_html)
        .bind(email.sent_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    /// Dispatch history for a user, newest first.
    pub async fn find_emails_for_user(&self, user_id: Uuid) -> Result<Vec<EmailRecord>, AppError> {
        sqlx::query_as::<_, EmailRecord>(
            "SELECT * FROM emails WHERE user_id = $1 ORDER BY sent_utc DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }
}
