use chrono::{Duration, NaiveDate, TimeZone};

use super::period::local_day;
use crate::models::{Entry, HabitId, HabitStats};

/// Distinct days, most recent first.
pub fn distinct_days_desc(days: impl IntoIterator<Item = NaiveDate>) -> Vec<NaiveDate> {
    let mut days: Vec<NaiveDate> = days.into_iter().collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();
    days
}

/// Consecutive days ending exactly at `today`. A day without an entry today
/// means no streak. Days after `today` are ignored.
pub fn current_streak(days: &[NaiveDate], today: NaiveDate) -> i32 {
    let mut streak = 0i32;
    let past = distinct_days_desc(days.iter().copied().filter(|d| *d <= today));

    for (i, day) in past.iter().enumerate() {
        if *day == today - Duration::days(i as i64) {
            streak += 1;
        } else {
            break;
        }
    }

    streak
}

/// Like [`current_streak`], but a run ending yesterday still counts since
/// today is not over yet.
pub fn running_streak(days: &[NaiveDate], today: NaiveDate) -> i32 {
    let streak = current_streak(days, today);
    if streak > 0 {
        return streak;
    }
    current_streak(days, today - Duration::days(1))
}

pub fn longest_streak(days: &[NaiveDate]) -> i32 {
    let mut longest = 0i32;
    let mut run = 0i32;
    let mut prev: Option<NaiveDate> = None;

    for day in distinct_days_desc(days.iter().copied()).iter().rev() {
        match prev {
            Some(p) if *day == p + Duration::days(1) => run += 1,
            _ => {
                longest = longest.max(run);
                run = 1;
            }
        }
        prev = Some(*day);
    }

    longest.max(run)
}

/// Stats recomputed from the entry log, for when the stats endpoint is
/// unavailable.
pub fn local_stats<Tz: TimeZone>(
    habit_id: HabitId,
    entries: &[Entry],
    tz: &Tz,
    today: NaiveDate,
) -> HabitStats {
    let days: Vec<NaiveDate> = entries
        .iter()
        .filter(|e| e.habit_id == habit_id)
        .map(|e| local_day(e, tz))
        .collect();

    HabitStats {
        habit_id,
        total_count: days.len() as i64,
        current_streak: running_streak(&days, today),
        longest_streak: longest_streak(&days),
    }
}
