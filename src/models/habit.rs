use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type HabitId = i64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
    /// Allows more than one completion per day.
    #[serde(rename = "multipleUpdate", default)]
    pub multiple_update: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub icon: String,
    /// Target for the goal window. 0 means no goal.
    #[serde(default)]
    pub goal: i32,
    #[serde(default)]
    pub goal_type: GoalType,
    #[serde(default)]
    pub reminder_enabled: bool,
    /// Legacy single reminder (HH:MM), superseded by `reminder_times`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reminder_times: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub visibility: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Habit {
    pub fn has_goal(&self) -> bool {
        self.goal > 0
    }

    /// Configured reminder times in order, falling back to the legacy
    /// single `reminder_time` when the list is empty.
    pub fn reminder_schedule(&self) -> Vec<NaiveTime> {
        let raw: Vec<&str> = if self.reminder_times.is_empty() {
            self.reminder_time
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .into_iter()
                .collect()
        } else {
            self.reminder_times.iter().map(String::as_str).collect()
        };

        raw.into_iter()
            .filter_map(|t| match parse_time_of_day(t) {
                Some(time) => Some(time),
                None => {
                    tracing::warn!(
                        habit_id = self.id,
                        time = %t,
                        "Ignoring malformed reminder time"
                    );
                    None
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GoalType {
    /// Consecutive days with at least one entry.
    #[default]
    Streak,
    /// Entries per calendar day.
    Count,
    /// Entries per Sunday-to-Saturday week.
    Weekly,
    /// Entries per calendar month.
    Monthly,
    /// Anything the backend sends that this client does not know.
    Unknown,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Streak => "streak",
            GoalType::Count => "count",
            GoalType::Weekly => "weekly",
            GoalType::Monthly => "monthly",
            GoalType::Unknown => "unknown",
        }
    }

    /// Goal types whose period can be completed, acknowledged and reset.
    pub fn is_renewable(&self) -> bool {
        matches!(self, GoalType::Count | GoalType::Weekly | GoalType::Monthly)
    }
}

impl From<String> for GoalType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "streak" => GoalType::Streak,
            "count" => GoalType::Count,
            "weekly" => GoalType::Weekly,
            "monthly" => GoalType::Monthly,
            _ => GoalType::Unknown,
        }
    }
}

impl From<GoalType> for String {
    fn from(value: GoalType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for GoalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a local time of day in `HH:MM` (seconds tolerated).
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
