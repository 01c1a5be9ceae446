use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::models::{GoalStatus, GoalType, Habit};

/// Ask the backend whether the habit's current goal period is met.
///
/// Habits without a goal and streak goals are never sent. Errors are logged
/// and swallowed: a failed check is the same as "nothing to acknowledge".
pub async fn check_goal_completion(api: &ApiClient, habit: &Habit) -> Option<GoalStatus> {
    match fetch_goal_status(api, habit).await {
        Ok(status) => status,
        Err(e) => {
            tracing::warn!(habit_id = habit.id, error = %e, "Goal check failed");
            None
        }
    }
}

/// Like [`check_goal_completion`] but keeps the error, so callers can tell
/// "nothing to acknowledge" from "could not ask".
pub async fn fetch_goal_status(api: &ApiClient, habit: &Habit) -> ClientResult<Option<GoalStatus>> {
    if !habit.has_goal() || habit.goal_type == GoalType::Streak {
        return Ok(None);
    }

    let status = api.check_goal(habit.id).await?;
    tracing::debug!(
        habit_id = habit.id,
        goal_completed = status.goal_completed,
        needs_renewal = status.needs_renewal,
        actual = status.actual_count,
        target = status.target_count,
        "Goal checked"
    );
    Ok(Some(status))
}
