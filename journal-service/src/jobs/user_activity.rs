//! Periodic refresh of user active flags.
//!
//! A user counts as active while their last authenticated request falls
//! inside the configured window; the flag is recomputed in both
//! directions on every tick.

use chrono::{Duration, Utc};
use service_core::error::AppError;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::AppState;

pub fn spawn(state: AppState, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let period =
            std::time::Duration::from_secs(state.config.jobs.activity_refresh_hours * 3600);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_hours = state.config.jobs.activity_refresh_hours,
            "User activity refresh job started"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("User activity refresh job shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = run(&state).await {
                        tracing::error!(error = %e, "User activity refresh failed");
                    }
                }
            }
        }
    })
}

pub async fn run(state: &AppState) -> Result<(), AppError> {
    let cutoff = Utc::now() - Duration::days(state.config.jobs.active_window_days);

    let (activated, deactivated) = state.db.refresh_active_flags(cutoff).await?;

    tracing::info!(
        activated,
        deactivated,
        window_days = state.config.jobs.active_window_days,
        "User active flags refreshed"
    );

    Ok(())
}
