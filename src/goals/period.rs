use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::models::{Entry, GoalType};

/// Calendar days making up a goal period, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalWindow {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl GoalWindow {
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.first_day <= day && day <= self.last_day
    }

    /// Period bounds as instants: midnight of the first day through 23:59:59
    /// of the last day in `tz`.
    pub fn bounds<Tz: TimeZone>(&self, tz: &Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59)?;
        let start = tz
            .from_local_datetime(&self.first_day.and_time(midnight))
            .earliest()?;
        let end = tz
            .from_local_datetime(&self.last_day.and_time(end_of_day))
            .latest()?;
        Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
    }
}

/// The window containing `today` for a period goal. Streak goals have no
/// window.
pub fn goal_window(goal_type: GoalType, today: NaiveDate) -> Option<GoalWindow> {
    match goal_type {
        GoalType::Count => Some(GoalWindow {
            first_day: today,
            last_day: today,
        }),
        GoalType::Weekly => {
            let first_day = week_start(today);
            Some(GoalWindow {
                first_day,
                last_day: first_day + Duration::days(6),
            })
        }
        GoalType::Monthly => {
            let first_day = today.with_day(1)?;
            let next_month = if today.month() == 12 {
                NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?
            } else {
                NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)?
            };
            Some(GoalWindow {
                first_day,
                last_day: next_month.pred_opt()?,
            })
        }
        GoalType::Streak | GoalType::Unknown => None,
    }
}

/// Instants bounding the period that contains `now`, in `now`'s timezone.
pub fn goal_period<Tz: TimeZone>(
    goal_type: GoalType,
    now: &DateTime<Tz>,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    goal_window(goal_type, now.date_naive())?.bounds(&now.timezone())
}

/// Weeks start on Sunday.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_since_sunday = date.weekday().num_days_from_sunday();
    date - Duration::days(days_since_sunday as i64)
}

/// Calendar day of an entry in the given timezone.
pub fn local_day<Tz: TimeZone>(entry: &Entry, tz: &Tz) -> NaiveDate {
    entry.completed_at.with_timezone(tz).date_naive()
}
