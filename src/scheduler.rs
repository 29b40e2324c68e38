//! Daily trigger for the selector.
//!
//! Sleeps until the configured UTC time of day, runs the selector once for that
//! slot's date, logs the outcome and repeats. A failed run waits for the next day.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::config::ScheduleConfig;
use crate::selector::DailySelector;
use crate::util::today_utc;

/// Spawn the daily loop, or return `None` when the schedule is disabled.
pub fn spawn_daily(selector: Arc<DailySelector>, cfg: ScheduleConfig) -> Option<JoinHandle<()>> {
    if !cfg.enabled {
        info!(target: "daily_problems", "Daily schedule disabled");
        return None;
    }
    let run_at = cfg.run_at();
    Some(tokio::spawn(async move {
        if cfg.run_on_startup {
            run_once(&selector, today_utc()).await;
        }
        let mut next = next_run_at(Utc::now(), run_at);
        loop {
            let delay = delay_until(Utc::now(), next);
            info!(target: "daily_problems", %next, wait_secs = delay.as_secs(), "Next selector run scheduled");
            tokio::time::sleep(delay).await;
            // The slot's date, not the clock at wake-up.
            run_once(&selector, target_date(next)).await;
            next = next_run_at(Utc::now().max(next), run_at);
        }
    }))
}

/// One fire-and-forget selector run: the outcome is only logged.
#[instrument(level = "info", skip(selector))]
pub async fn run_once(selector: &DailySelector, date: NaiveDate) {
    match selector.run_for_date(date).await {
        Ok(outcome) => {
            info!(target: "daily_problems", date = %outcome.date, absent = ?outcome.problems.absent(), "Scheduled selection succeeded")
        }
        Err(e) => error!(target: "daily_problems", error = %e, "Scheduled selection failed"),
    }
}

/// First `run_at` (UTC) strictly after `now`.
pub fn next_run_at(now: DateTime<Utc>, run_at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(run_at).and_utc();
    if today > now {
        today
    } else {
        today.checked_add_days(Days::new(1)).unwrap_or(today)
    }
}

/// Date a run scheduled for `slot` selects problems for.
pub fn target_date(slot: DateTime<Utc>) -> NaiveDate {
    slot.date_naive()
}

/// Time from `now` until `next`; zero once it has passed.
pub fn delay_until(now: DateTime<Utc>, next: DateTime<Utc>) -> Duration {
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

/// Time from `now` until the next `run_at` (UTC). A run time equal to `now` is
/// pushed to the following day.
pub fn delay_until_next_run(now: DateTime<Utc>, run_at: NaiveTime) -> Duration {
    delay_until(now, next_run_at(now, run_at))
}
