use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::goals::{GoalFlow, Trigger};
use crate::models::HabitId;
use crate::reminders::ReminderScheduler;

#[derive(Debug, Default)]
pub struct RefreshReport {
    pub habits: usize,
    pub reminders: usize,
    /// Habits that moved to the completion prompt during this pass.
    pub prompted: Vec<HabitId>,
}

// ── Refresh Worker ───────────────────────────────────────────────────────────

/// Reload habits, re-arm reminders and sweep goals every `every`. Stops when
/// the session expires.
pub fn spawn_refresh_worker(
    api: ApiClient,
    scheduler: ReminderScheduler,
    flow: Arc<Mutex<GoalFlow>>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match refresh_once(&api, &scheduler, &flow).await {
                Ok(report) => {
                    tracing::info!(
                        habits = report.habits,
                        reminders = report.reminders,
                        prompted = ?report.prompted,
                        "Refresh complete"
                    );
                }
                Err(ClientError::Unauthorized) => {
                    tracing::warn!("Session expired, stopping refresh worker");
                    scheduler.cancel_all().await;
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Refresh worker error");
                }
            }
        }
    })
}

/// One refresh pass. Reminders are rebuilt from scratch so deleted habits
/// stop firing.
pub async fn refresh_once(
    api: &ApiClient,
    scheduler: &ReminderScheduler,
    flow: &Mutex<GoalFlow>,
) -> ClientResult<RefreshReport> {
    let habits = api.list_habits().await?;

    scheduler.cancel_all().await;
    let reminders = scheduler.schedule_all(&habits).await;

    let mut prompted = Vec::new();
    let mut flow = flow.lock().await;
    for habit in habits.iter().filter(|h| h.has_goal()) {
        if flow.check(api, habit, Trigger::Periodic).await {
            prompted.push(habit.id);
        }
    }

    Ok(RefreshReport {
        habits: habits.len(),
        reminders,
        prompted,
    })
}
