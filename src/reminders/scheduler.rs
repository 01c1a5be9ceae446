use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone};
use serde_json::json;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::notifier::{Notification, Notifier, Permission};
use crate::error::{ClientError, ClientResult};
use crate::models::{parse_time_of_day, Habit, HabitId};

/// One daily reminder: a habit at a local time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReminderKey {
    pub habit_id: HabitId,
    pub time: NaiveTime,
}

impl ReminderKey {
    /// Notification tag, unique per key.
    pub fn tag(&self) -> String {
        format!("habit-{}-{}", self.habit_id, self.time.format("%H:%M"))
    }
}

/// Daily reminder timers, one tokio task per `(habit, time)`.
///
/// Clone is cheap (Arc-based) and clones share the same timers. Timers are
/// not persisted and keep running after the last clone is dropped; call
/// [`ReminderScheduler::cancel_all`] on shutdown.
#[derive(Clone)]
pub struct ReminderScheduler {
    timers: Arc<Mutex<HashMap<ReminderKey, CancellationToken>>>,
    notifier: Arc<dyn Notifier>,
}

impl ReminderScheduler {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            timers: Arc::new(Mutex::new(HashMap::new())),
            notifier,
        }
    }

    /// Arm a daily reminder at `time` ("HH:MM", local). Replaces any timer
    /// already armed for the same habit and time.
    pub async fn schedule(
        &self,
        habit_id: HabitId,
        habit_name: &str,
        time: &str,
    ) -> ClientResult<ReminderKey> {
        let time = parse_reminder_time(time)?;
        Ok(self.arm(habit_id, habit_name, time).await)
    }

    /// Re-arm every enabled reminder of `habits`. Each listed habit's old
    /// timers are dropped first, so removed times stop firing. Returns the
    /// number of timers armed.
    pub async fn schedule_all(&self, habits: &[Habit]) -> usize {
        let mut armed = 0;

        for habit in habits.iter().filter(|h| h.reminder_enabled) {
            let times = habit.reminder_schedule();
            if times.is_empty() {
                continue;
            }

            self.cancel(habit.id, None).await;
            for time in times {
                self.arm(habit.id, &habit.name, time).await;
                armed += 1;
            }
        }

        tracing::info!(armed, habits = habits.len(), "Reminders scheduled");
        armed
    }

    /// Cancel one reminder of a habit, or all of them when `time` is None.
    /// Takes a parsed time since keys are stored that way; see
    /// [`ReminderScheduler::cancel_at`] for the "HH:MM" form. Returns how many
    /// timers were stopped.
    pub async fn cancel(&self, habit_id: HabitId, time: Option<NaiveTime>) -> usize {
        let mut timers = self.timers.lock().await;
        let keys: Vec<ReminderKey> = timers
            .keys()
            .filter(|k| k.habit_id == habit_id && time.map_or(true, |t| k.time == t))
            .copied()
            .collect();

        for key in &keys {
            if let Some(token) = timers.remove(key) {
                token.cancel();
            }
        }

        if !keys.is_empty() {
            tracing::debug!(habit_id, cancelled = keys.len(), "Reminders cancelled");
        }
        keys.len()
    }

    /// [`ReminderScheduler::cancel`] for a single "HH:MM" time, the same
    /// form [`ReminderScheduler::schedule`] takes.
    pub async fn cancel_at(&self, habit_id: HabitId, time: &str) -> ClientResult<usize> {
        let time = parse_reminder_time(time)?;
        Ok(self.cancel(habit_id, Some(time)).await)
    }

    pub async fn cancel_all(&self) -> usize {
        let mut timers = self.timers.lock().await;
        let count = timers.len();
        for (_, token) in timers.drain() {
            token.cancel();
        }
        tracing::info!(cancelled = count, "All reminders cancelled");
        count
    }

    /// Armed reminders, ordered by habit then time.
    pub async fn pending(&self) -> Vec<ReminderKey> {
        let mut keys: Vec<ReminderKey> = self.timers.lock().await.keys().copied().collect();
        keys.sort();
        keys
    }

    pub async fn pending_count(&self) -> usize {
        self.timers.lock().await.len()
    }

    pub fn permission_status(&self) -> Permission {
        self.notifier.permission()
    }

    /// Send a notification right away to check the host setup. Returns
    /// false when permission is not granted.
    pub async fn send_test_notification(&self) -> ClientResult<bool> {
        if self.notifier.request_permission().await != Permission::Granted {
            return Ok(false);
        }

        let notification = Notification {
            title: "Test notification".into(),
            body: "Notifications are working!".into(),
            tag: "habit-test".into(),
            data: serde_json::Value::Null,
        };
        self.notifier.notify(&notification).await?;
        Ok(true)
    }

    async fn arm(&self, habit_id: HabitId, habit_name: &str, time: NaiveTime) -> ReminderKey {
        let key = ReminderKey { habit_id, time };
        let token = CancellationToken::new();

        if let Some(previous) = self.timers.lock().await.insert(key, token.clone()) {
            previous.cancel();
        }

        tokio::spawn(run_reminder(
            self.notifier.clone(),
            key,
            habit_name.to_string(),
            token,
        ));

        tracing::info!(
            habit_id,
            time = %time.format("%H:%M"),
            habit = %habit_name,
            "Reminder scheduled"
        );
        key
    }
}

fn parse_reminder_time(raw: &str) -> ClientResult<NaiveTime> {
    parse_time_of_day(raw)
        .ok_or_else(|| ClientError::Validation(format!("Reminder time {raw:?} must be HH:MM")))
}

/// Next instant at `time` strictly after `now`: today if still ahead,
/// otherwise tomorrow. Times skipped by a DST jump move to the next day
/// that has them.
pub fn next_occurrence<Tz: TimeZone>(now: &DateTime<Tz>, time: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();

    (0..=2)
        .filter_map(|offset| today.checked_add_signed(Duration::days(offset)))
        .filter_map(|day| tz.from_local_datetime(&day.and_time(time)).earliest())
        .find(|candidate| candidate > now)
        .unwrap_or_else(|| now.clone() + Duration::days(1))
}

async fn run_reminder(
    notifier: Arc<dyn Notifier>,
    key: ReminderKey,
    habit_name: String,
    token: CancellationToken,
) {
    // Wall time is read once and then advanced with the runtime clock.
    let started_wall = Local::now();
    let started = Instant::now();
    let wall_now = || {
        let elapsed = Duration::from_std(started.elapsed()).unwrap_or_else(|_| Duration::zero());
        started_wall + elapsed
    };

    let mut after = wall_now();
    loop {
        let fire_at = next_occurrence(&after, key.time);
        let delay = (fire_at - wall_now()).to_std().unwrap_or_default();

        tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!(
                    habit_id = key.habit_id,
                    time = %key.time.format("%H:%M"),
                    "Reminder timer stopped"
                );
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }

        fire(notifier.as_ref(), &key, &habit_name).await;
        after = wall_now().max(fire_at);
    }
}

async fn fire(notifier: &dyn Notifier, key: &ReminderKey, habit_name: &str) {
    let permission = notifier.request_permission().await;
    if permission != Permission::Granted {
        tracing::debug!(
            habit_id = key.habit_id,
            ?permission,
            "Reminder skipped, notifications not allowed"
        );
        return;
    }

    let notification = Notification {
        title: format!("Reminder: {habit_name}"),
        body: "Don't forget to complete your habit today!".into(),
        tag: key.tag(),
        data: json!({ "habit_id": key.habit_id, "habit_name": habit_name }),
    };

    if let Err(e) = notifier.notify(&notification).await {
        tracing::error!(habit_id = key.habit_id, error = %e, "Failed to send reminder");
    }
}
