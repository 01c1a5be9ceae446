use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::Serialize;

use super::period::{goal_period, goal_window, local_day};
use super::streak::current_streak;
use crate::models::{Entry, GoalStatus, GoalType, Habit};

/// Where a progress figure came from. Informational only: both paths
/// produce the same shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressSource {
    Backend,
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub current: i32,
    pub target: i32,
    /// `current / target * 100`, clamped to [0, 100].
    pub percentage: f64,
    pub label: &'static str,
    pub goal_type: GoalType,
    pub source: ProgressSource,
}

impl GoalProgress {
    fn new(current: i32, target: i32, goal_type: GoalType, source: ProgressSource) -> Self {
        let percentage = (f64::from(current) / f64::from(target) * 100.0).clamp(0.0, 100.0);
        Self {
            current,
            target,
            percentage,
            label: window_label(goal_type),
            goal_type,
            source,
        }
    }

    /// Percentage as shown to the user.
    pub fn rounded_percentage(&self) -> u8 {
        self.percentage.round() as u8
    }

    pub fn is_met(&self) -> bool {
        self.current >= self.target
    }
}

fn window_label(goal_type: GoalType) -> &'static str {
    match goal_type {
        GoalType::Count => "today",
        GoalType::Weekly => "this week",
        GoalType::Monthly => "this month",
        GoalType::Streak | GoalType::Unknown => "day streak",
    }
}

/// Progress toward the habit's goal as of now, in the local timezone.
pub fn compute_progress(
    habit: &Habit,
    entries: &[Entry],
    status: Option<&GoalStatus>,
) -> Option<GoalProgress> {
    compute_progress_at(habit, entries, status, &Local::now())
}

/// Progress toward the habit's goal as of `now`. Entry days are taken in
/// `now`'s timezone.
///
/// Returns `None` when the habit has no goal. Unknown goal types are
/// treated as streaks. A backend status with
/// `has_goal` and a positive target wins over the entry log since it knows
/// about resets this client never sees.
pub fn compute_progress_at<Tz: TimeZone>(
    habit: &Habit,
    entries: &[Entry],
    status: Option<&GoalStatus>,
    now: &DateTime<Tz>,
) -> Option<GoalProgress> {
    if !habit.has_goal() {
        return None;
    }

    if let Some(status) = status.filter(|s| s.has_goal && s.target_count > 0) {
        return Some(GoalProgress::new(
            status.actual_count,
            status.target_count,
            habit.goal_type,
            ProgressSource::Backend,
        ));
    }

    let current = local_count(habit, entries, now)?;
    Some(GoalProgress::new(
        current,
        habit.goal,
        habit.goal_type,
        ProgressSource::Local,
    ))
}

/// Local approximation of the backend's goal check. `needs_renewal` stays
/// false: whether the period was already acknowledged is only known to the
/// backend.
pub fn local_goal_status<Tz: TimeZone>(
    habit: &Habit,
    entries: &[Entry],
    now: &DateTime<Tz>,
) -> Option<GoalStatus> {
    if !habit.has_goal() {
        return Some(GoalStatus::default());
    }

    let actual_count = local_count(habit, entries, now)?;
    let bounds = goal_period(habit.goal_type, now);

    Some(GoalStatus {
        has_goal: true,
        goal_completed: habit.goal_type.is_renewable() && actual_count >= habit.goal,
        needs_renewal: false,
        already_recorded: false,
        actual_count,
        target_count: habit.goal,
        goal_type: habit.goal_type,
        period_start: bounds.map(|(start, _)| start),
        period_end: bounds.map(|(_, end)| end),
    })
}

fn local_count<Tz: TimeZone>(habit: &Habit, entries: &[Entry], now: &DateTime<Tz>) -> Option<i32> {
    let tz = now.timezone();
    let today = now.date_naive();
    let days = entries
        .iter()
        .filter(|e| e.habit_id == habit.id)
        .map(|e| local_day(e, &tz));

    match habit.goal_type {
        GoalType::Count | GoalType::Weekly | GoalType::Monthly => {
            let window = goal_window(habit.goal_type, today)?;
            Some(days.filter(|d| window.contains(*d)).count() as i32)
        }
        GoalType::Streak | GoalType::Unknown => {
            let days: Vec<NaiveDate> = days.collect();
            Some(current_streak(&days, today))
        }
    }
}
