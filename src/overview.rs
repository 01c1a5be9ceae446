use chrono::Local;
use futures_util::future::join_all;
use serde::Serialize;

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::goals::{check_goal_completion, compute_progress_at, local_stats, GoalProgress};
use crate::models::{GoalStatus, Habit, HabitStats};

/// Dashboard row for one habit.
#[derive(Debug, Clone, Serialize)]
pub struct HabitOverview {
    pub habit: Habit,
    pub entry_count: usize,
    pub progress: Option<GoalProgress>,
    pub goal_status: Option<GoalStatus>,
    pub stats: HabitStats,
}

/// Load entries, goal status and stats for every habit concurrently.
///
/// Fails if any habit's entries cannot be loaded. A failed goal check
/// falls back to local progress and a failed stats call to stats computed
/// from the entries.
pub async fn load_overview(api: &ApiClient, habits: &[Habit]) -> ClientResult<Vec<HabitOverview>> {
    let rows = join_all(habits.iter().map(|habit| load_one(api, habit))).await;
    rows.into_iter().collect()
}

async fn load_one(api: &ApiClient, habit: &Habit) -> ClientResult<HabitOverview> {
    let (entries, goal_status, stats) = tokio::join!(
        api.list_entries(habit.id),
        check_goal_completion(api, habit),
        api.habit_stats(habit.id),
    );
    let entries = entries?;

    let now = Local::now();
    let stats = stats.unwrap_or_else(|e| {
        tracing::warn!(habit_id = habit.id, error = %e, "Stats unavailable, computing locally");
        local_stats(habit.id, &entries, &Local, now.date_naive())
    });
    let progress = compute_progress_at(habit, &entries, goal_status.as_ref(), &now);

    if let Some(p) = &progress {
        tracing::debug!(
            habit_id = habit.id,
            current = p.current,
            target = p.target,
            percentage = p.rounded_percentage(),
            source = ?p.source,
            "Progress computed"
        );
    }

    Ok(HabitOverview {
        habit: habit.clone(),
        entry_count: entries.len(),
        progress,
        goal_status,
        stats,
    })
}
