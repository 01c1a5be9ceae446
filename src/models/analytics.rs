use serde::{Deserialize, Serialize};

use super::habit::{null_as_default, HabitId};

/// Response for GET /analytics?period={days}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub overview: AnalyticsOverview,
    #[serde(default, deserialize_with = "null_as_default")]
    pub habit_trends: Vec<HabitTrend>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub activity_calendar: Vec<ActivityCalendar>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weekly_stats: Vec<WeeklyStats>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category_stats: Vec<CategoryStats>,
}

impl AnalyticsResponse {
    /// Busiest day in the calendar, if any.
    pub fn peak_day(&self) -> Option<&ActivityCalendar> {
        self.activity_calendar.iter().max_by_key(|d| d.count)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsOverview {
    pub total_habits: i64,
    /// Habits with an entry in the last 7 days.
    pub active_habits: i64,
    pub total_entries: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    /// Percentages, 0-100.
    pub completion_rate: f64,
    pub weekly_progress: f64,
    pub monthly_progress: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitTrend {
    pub habit_id: HabitId,
    pub habit_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    pub total_count: i64,
    /// Entries in the last 7 days.
    pub weekly_count: i64,
    #[serde(default)]
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
    #[serde(other)]
    Unknown,
}

/// One heatmap cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityCalendar {
    /// YYYY-MM-DD
    pub date: String,
    pub count: i64,
    /// Intensity 0-4, relative to the busiest day in the period.
    pub level: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub week_start: String,
    pub completed: i64,
    pub total: i64,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    pub habit_count: i64,
    pub completed: i64,
    pub total: i64,
    pub completion_rate: f64,
}
