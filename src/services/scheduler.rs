//! Weekly reminder schedule: fire the dispatch every Friday morning and keep
//! ticking regardless of how individual runs go.

use std::str::FromStr;

use chrono::{FixedOffset, Utc};
use cron::Schedule;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::ReminderService;

/// Fridays at 10:00 in the shop's local offset. Missed slots are not made up;
/// the next Friday comes around soon enough.
const REMINDER_CRON: &str = "0 0 10 * * FRI";
const LOCAL_OFFSET_HOURS: i32 = 7;

pub struct ReminderScheduler {
    handle: Option<JoinHandle<()>>,
    shutdown: watch::Sender<bool>,
}

impl ReminderScheduler {
    /// Spawn the ticking loop. The returned handle owns the background task;
    /// call [`ReminderScheduler::shutdown`] to stop it.
    pub fn start(service: ReminderService) -> Self {
        let (shutdown, mut stopped) = watch::channel(false);
        // The expression is a compile-time constant; parse failure is a bug.
        let schedule =
            Schedule::from_str(REMINDER_CRON).unwrap_or_else(|e| panic!("bad cron expr: {e}"));
        let tz = FixedOffset::west_opt(LOCAL_OFFSET_HOURS * 3600)
            .unwrap_or_else(|| panic!("bad utc offset"));

        let handle = tokio::spawn(async move {
            loop {
                let now = Utc::now().with_timezone(&tz);
                let Some(next) = schedule.after(&now).next() else {
                    tracing::error!("cron schedule yielded no upcoming run, stopping");
                    return;
                };
                let wait = (next - now)
                    .to_std()
                    .unwrap_or(std::time::Duration::ZERO);
                tracing::info!(next_run = %next, "reminder run scheduled");

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = stopped.changed() => {
                        tracing::info!("reminder scheduler stopping");
                        return;
                    }
                }

                // Run in its own task so shutdown never cuts a dispatch short.
                let service = service.clone();
                tokio::spawn(async move {
                    if let Err(e) = service.send_order_reminders().await {
                        tracing::warn!(error = %e, "scheduled reminder run failed");
                    }
                });
            }
        });

        ReminderScheduler {
            handle: Some(handle),
            shutdown,
        }
    }

    /// Stop the ticking loop. An in-flight dispatch keeps running to
    /// completion.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}
