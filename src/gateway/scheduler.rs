//! Weekly report delivery — the scheduled job and the per-user report
//! pipeline.

use super::Gateway;
use crate::{feedback, stats};
use chrono::{DateTime, Datelike, Duration as ChronoDuration, FixedOffset};
use sambo_core::error::SamboError;
use sambo_core::message::OutgoingMessage;
use sambo_core::week;
use sambo_sheets::{RowStore, Table};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

const GOAL_PROMPT: &str =
    "How do you want to improve next week? Reply with a short goal and I'll save it.";

impl Gateway {
    /// Sleep until the configured weekday and hour, run the weekly fan-out,
    /// repeat.
    pub(super) async fn report_loop(self: Arc<Self>) {
        loop {
            let now = week::moscow_now();
            let next = next_report_instant(now, self.report_config.weekday, self.report_config.hour);
            info!("weekly report scheduled for {next}");
            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            self.clone().run_weekly_reports().await;

            // Step past the trigger minute so the next computation lands a
            // week ahead rather than re-firing immediately.
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
    }

    /// One scheduled run: report to every user seen in any table. Failures
    /// are isolated per user.
    pub(super) async fn run_weekly_reports(self: Arc<Self>) {
        let Some(store) = self.store.clone() else {
            warn!("weekly report run skipped: no row store");
            return;
        };

        // Stale goal prompts from last week must not swallow entries.
        self.awaiting_goal.lock().await.clear();

        let users = match distinct_users(store.as_ref()).await {
            Ok(users) => users,
            Err(e) => {
                error!("weekly report run aborted, cannot list users: {e}");
                return;
            }
        };
        if users.is_empty() {
            info!("weekly report run: no users recorded yet");
            return;
        }
        info!("weekly report run: delivering to {} user(s)", users.len());

        let semaphore = Arc::new(Semaphore::new(self.report_config.max_concurrent.max(1)));
        let mut tasks = JoinSet::new();
        for user in users {
            // Hold the permit before spawning: otherwise queued tasks
            // fire back to back when permits free up and the pause below
            // only spaces the spawns, not the sends.
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let gw = self.clone();
            tasks.spawn(async move {
                let _permit = permit;
                // Private chats: the chat id equals the user id.
                if let Err(e) = gw.deliver_report(&user, &user).await {
                    error!("weekly report delivery to {user} failed: {e}");
                }
            });
            if self.report_config.send_pause_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.report_config.send_pause_ms)).await;
            }
        }
        while tasks.join_next().await.is_some() {}
        info!("weekly report run complete");
    }

    /// Build and send one user's report, then conditionally prompt for an
    /// improvement goal. Used by both the scheduler and `/report`.
    pub(super) async fn deliver_report(
        &self,
        user_id: &str,
        reply_target: &str,
    ) -> Result<(), SamboError> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| SamboError::Config("reports need a row store".to_string()))?;

        let now = week::moscow_now();
        let week_id = week::week_id(now);
        let current = stats::activity_stats(store.as_ref(), user_id, &week_id).await?;
        let trailing = stats::trailing_activity_stats(
            store.as_ref(),
            user_id,
            now,
            self.report_config.trailing_weeks,
        )
        .await?;
        let consumption = stats::consumption_stats(store.as_ref(), user_id, &week_id).await?;
        let language = stats::language_stats(store.as_ref(), user_id, &week_id).await?;

        let report = feedback::WeeklyReport {
            week_id: week_id.clone(),
            current,
            trailing,
            consumption,
            language,
        };
        let text = feedback::generate(self.generator.as_deref(), &report).await;

        let channel = self
            .report_channel()
            .ok_or_else(|| SamboError::Channel("no channel for report delivery".to_string()))?;
        channel
            .send(OutgoingMessage::text(text, Some(reply_target.to_string())))
            .await?;

        if feedback::should_request_goals(&report.current, report.previous()) {
            channel
                .send(OutgoingMessage::text(
                    GOAL_PROMPT,
                    Some(reply_target.to_string()),
                ))
                .await?;
            self.awaiting_goal
                .lock()
                .await
                .insert(user_id.to_string(), week_id);
        }
        Ok(())
    }
}

/// Next occurrence of `weekday` (0 = Monday .. 6 = Sunday) at `hour:00`
/// Moscow time, strictly after `now`.
pub(super) fn next_report_instant(
    now: DateTime<FixedOffset>,
    weekday: u8,
    hour: u32,
) -> DateTime<FixedOffset> {
    let weekday = i64::from(weekday.min(6));
    let hour = hour.min(23);
    let today = i64::from(now.weekday().num_days_from_monday());
    let days_ahead = (weekday - today).rem_euclid(7);

    let date = now.date_naive() + ChronoDuration::days(days_ahead);
    let candidate = date
        .and_hms_opt(hour, 0, 0)
        .and_then(|naive| naive.and_local_timezone(*now.offset()).single())
        .unwrap_or(now);
    if candidate <= now {
        candidate + ChronoDuration::weeks(1)
    } else {
        candidate
    }
}

/// Every user id seen in any of the three tables, sorted.
async fn distinct_users(store: &dyn RowStore) -> Result<BTreeSet<String>, SamboError> {
    let mut users = BTreeSet::new();
    for table in Table::ALL {
        for row in store.rows(table).await? {
            if let Some(user) = row.cells.first() {
                if !user.is_empty() {
                    users.insert(user.clone());
                }
            }
        }
    }
    Ok(users)
}
