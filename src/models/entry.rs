use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::habit::HabitId;

/// One recorded completion of a habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub habit_id: HabitId,
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitStats {
    pub habit_id: HabitId,
    pub total_count: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
}
