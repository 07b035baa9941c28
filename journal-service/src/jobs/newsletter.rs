//! Periodic newsletter batch.
//!
//! Sends this week's issue to every active, opted-in user. Per-user
//! failures are logged and skipped; the batch never aborts early. The
//! first tick after boot is skipped so a restart does not double-send.

use service_core::error::AppError;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::services::newsletter::send_to_user;
use crate::AppState;

pub fn spawn(state: AppState, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let period =
            std::time::Duration::from_secs(state.config.jobs.newsletter_interval_hours * 3600);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // interval fires immediately; swallow the boot tick.
        ticker.tick().await;

        tracing::info!(
            interval_hours = state.config.jobs.newsletter_interval_hours,
            "Newsletter job started"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Newsletter job shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = run(&state).await {
                        tracing::error!(error = %e, "Newsletter batch failed");
                    }
                }
            }
        }
    })
}

/// Dispatch one batch. Returns Ok even when individual sends fail.
pub async fn run(state: &AppState) -> Result<(), AppError> {
    if !state.email.is_enabled() {
        tracing::info!("Email provider disabled, skipping newsletter batch");
        return Ok(());
    }

    let recipients = state.db.find_newsletter_recipients().await?;
    let total = recipients.len();
    let mut sent = 0usize;

    for user in &recipients {
        match send_to_user(&state.db, &state.insight, &state.quotes, &state.email, user).await {
            Ok(_) => sent += 1,
            Err(e) => {
                tracing::error!(
                    user_id = %user.user_id,
                    error = %e,
                    "Newsletter dispatch failed for user"
                );
            }
        }
    }

    tracing::info!(sent, total, "Newsletter batch complete");

    Ok(())
}
