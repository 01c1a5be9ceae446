use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::habit::{GoalType, HabitId};

/// Evaluation of the current goal period, as reported by the backend's
/// check-goal endpoint or approximated locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalStatus {
    pub has_goal: bool,
    #[serde(default)]
    pub goal_completed: bool,
    /// Target met for this period and not yet acknowledged.
    #[serde(default)]
    pub needs_renewal: bool,
    #[serde(default)]
    pub already_recorded: bool,
    #[serde(default)]
    pub actual_count: i32,
    #[serde(default)]
    pub target_count: i32,
    #[serde(default)]
    pub goal_type: GoalType,
    #[serde(default)]
    pub period_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub period_end: Option<DateTime<Utc>>,
}

/// An acknowledged goal achievement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalCompletion {
    pub id: i64,
    pub habit_id: HabitId,
    pub goal_type: GoalType,
    pub goal_value: i32,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub actual_count: i32,
    #[serde(default)]
    pub notes: String,
    pub completed_at: DateTime<Utc>,
}

/// POST /habits/{id}/goal-completions
#[derive(Debug, Clone, Serialize)]
pub struct NewGoalCompletion {
    pub goal_type: GoalType,
    pub goal_value: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end: Option<DateTime<Utc>>,
    pub actual_count: i32,
    pub notes: String,
}

impl NewGoalCompletion {
    pub fn from_status(status: &GoalStatus, notes: impl Into<String>) -> Self {
        Self {
            goal_type: status.goal_type,
            goal_value: status.target_count,
            period_start: status.period_start,
            period_end: status.period_end,
            actual_count: status.actual_count,
            notes: notes.into(),
        }
    }
}

/// Response for POST /habits/{id}/reset-goal
#[derive(Debug, Clone, Deserialize)]
pub struct ResetGoalResponse {
    #[serde(default)]
    pub message: String,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_records: i64,
}
