//! Background jobs on independent interval timers.
//!
//! Each job owns one spawned loop; the body is awaited inline so a job
//! runs at most once per schedule tick. Shutdown goes through a shared
//! CancellationToken.

pub mod newsletter;
pub mod user_activity;

use tokio_util::sync::CancellationToken;

use crate::AppState;

/// Spawn every periodic job. Returns immediately; the loops stop when
/// `shutdown` is cancelled.
pub fn spawn_jobs(state: AppState, shutdown: CancellationToken) {
    user_activity::spawn(state.clone(), shutdown.clone());
    newsletter::spawn(state, shutdown);
}
