//! Newsletter composition and dispatch for a single recipient.
//!
//! Shared between the self-service endpoint and the periodic batch job.

use chrono::{Duration, Utc};
use service_core::error::AppError;
use std::sync::Arc;

use super::database::Database;
use super::insight::InsightService;
use super::providers::{EmailMessage, EmailProvider, Quote, QuoteIndex};
use super::timeline;
use crate::models::{EmailKind, EmailRecord, User};
use crate::services::metrics;

/// How far back an issue looks.
const NEWSLETTER_WINDOW_DAYS: i64 = 7;

fn fallback_quote() -> Quote {
    Quote {
        text: "Little strokes fell great oaks.".to_string(),
        author: Some("Benjamin Franklin".to_string()),
        score: None,
    }
}

/// Pick a quote semantically close to the user's ethos. Index failures
/// and empty results degrade to the fallback; the newsletter always
/// ships.
async fn pick_quote(quotes: &Arc<dyn QuoteIndex>, query: &str) -> Quote {
    if !quotes.is_enabled() {
        return fallback_quote();
    }

    match quotes.search(query, 1).await {
        Ok(hits) => hits.into_iter().next().unwrap_or_else(fallback_quote),
        Err(e) => {
            tracing::warn!(error = %e, "Quote index lookup failed, using fallback");
            fallback_quote()
        }
    }
}

/// Compose this week's issue for one user, send it, and record the
/// dispatch.
pub async fn send_to_user(
    db: &Database,
    insight: &InsightService,
    quotes: &Arc<dyn QuoteIndex>,
    email: &Arc<dyn EmailProvider>,
    user: &User,
) -> Result<EmailRecord, AppError> {
    let to_utc = Utc::now();
    let from_utc = to_utc - Duration::days(NEWSLETTER_WINDOW_DAYS);

    let activities = db
        .find_activities_in_range(user.user_id, from_utc, to_utc)
        .await?;
    let tl = timeline::group_by_day(activities);

    let (done, total) = db.count_subgoal_progress(user.user_id).await?;

    let ethos = db.find_ethos(user.user_id).await?;
    let quote_query = ethos
        .as_ref()
        .map(|e| e.statement.clone())
        .unwrap_or_else(|| "perseverance and daily habits".to_string());
    let quote = pick_quote(quotes, &quote_query).await;

    let recipient_name = user
        .display_name
        .clone()
        .unwrap_or_else(|| user.username.clone());

    let issue = insight
        .compose_newsletter(&recipient_name, &tl, done, total, &quote)
        .await?;

    let message = EmailMessage {
        to: user.email.clone(),
        to_name: user.display_name.clone(),
        subject: issue.subject.clone(),
        body_text: Some(issue.body_text.clone()),
        body_html: Some(issue.body_html.clone()),
    };

    email.send(&message).await.map_err(AppError::from)?;
    metrics::record_email_sent(EmailKind::Newsletter.as_str());

    let record = EmailRecord::new(
        user.user_id,
        EmailKind::Newsletter,
        issue.subject,
        issue.body_text,
        Some(issue.body_html),
    );
    db.insert_email(&record).await?;

    tracing::info!(
        user_id = %user.user_id,
        email_id = %record.email_id,
        "Newsletter dispatched"
    );

    Ok(record)
}
