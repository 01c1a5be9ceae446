pub mod analytics;
pub mod entry;
pub mod goal;
pub mod habit;

pub use analytics::{
    ActivityCalendar, AnalyticsOverview, AnalyticsResponse, CategoryStats, HabitTrend, Trend,
    WeeklyStats,
};
pub use entry::{Entry, HabitStats};
pub use goal::{GoalCompletion, GoalStatus, NewGoalCompletion, ResetGoalResponse};
pub use habit::{parse_time_of_day, GoalType, Habit, HabitId};
