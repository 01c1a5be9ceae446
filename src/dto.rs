//! # Request bodies sent to the habits API
//!
//! Conventions:
//! - `*Request` → serialized as the JSON body of a POST/PUT
//! - Validation runs client-side via `validator` before anything is sent
//! - Cross-field rules live in schema-level validators at the bottom

use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::models::habit::{parse_time_of_day, GoalType, Habit};

// ============================================================================
// Habits
// ============================================================================

/// POST /habits and PUT /habits/{id}. The backend replaces every field on
/// update, so edits start from `HabitRequest::from(&habit)`.
#[derive(Debug, Clone, Serialize, Validate)]
#[validate(schema(function = "validate_reminders"))]
pub struct HabitRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be under 500 characters"))]
    pub description: String,

    pub is_active: bool,

    #[serde(rename = "multipleUpdate")]
    pub multiple_update: bool,

    pub category: String,
    pub icon: String,

    /// Goal target. 0 disables the goal.
    #[validate(range(min = 0, max = 1000, message = "Goal must be between 0 and 1000"))]
    pub goal: i32,

    pub goal_type: GoalType,

    pub reminder_enabled: bool,

    /// Reminder times as HH:MM in local time.
    pub reminder_times: Vec<String>,

    /// "public", "private" or "friends"
    pub visibility: String,
}

impl HabitRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            is_active: true,
            multiple_update: false,
            category: String::new(),
            icon: String::new(),
            goal: 0,
            goal_type: GoalType::Streak,
            reminder_enabled: false,
            reminder_times: Vec::new(),
            visibility: "private".into(),
        }
    }
}

impl From<&Habit> for HabitRequest {
    fn from(habit: &Habit) -> Self {
        Self {
            name: habit.name.clone(),
            description: habit.description.clone(),
            is_active: habit.is_active,
            multiple_update: habit.multiple_update,
            category: habit.category.clone(),
            icon: habit.icon.clone(),
            goal: habit.goal,
            goal_type: habit.goal_type,
            reminder_enabled: habit.reminder_enabled,
            reminder_times: habit
                .reminder_schedule()
                .into_iter()
                .map(|t| t.format("%H:%M").to_string())
                .collect(),
            visibility: habit.visibility.clone(),
        }
    }
}

// ============================================================================
// Entries
// ============================================================================

/// POST /habits/{id}/entries
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewEntryRequest {
    /// Defaults to now when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[validate(length(max = 1000, message = "Notes must be under 1000 characters"))]
    pub notes: String,
}

impl NewEntryRequest {
    pub fn now(notes: impl Into<String>) -> Self {
        Self {
            completed_at: Some(Utc::now()),
            notes: notes.into(),
        }
    }
}

// ============================================================================
// Cross-field validation
// ============================================================================

fn validate_reminders(req: &HabitRequest) -> Result<(), ValidationError> {
    if let Some(bad) = req
        .reminder_times
        .iter()
        .find(|t| parse_time_of_day(t).is_none())
    {
        let mut err = ValidationError::new("reminder_time_format");
        err.message = Some(format!("Reminder time {bad:?} must be HH:MM").into());
        return Err(err);
    }

    // A daily count goal of N gets at most N reminders (at least one).
    if req.goal_type == GoalType::Count {
        let max = req.goal.max(1) as usize;
        if req.reminder_times.len() > max {
            let mut err = ValidationError::new("too_many_reminders");
            err.message = Some(format!("At most {max} reminder times for this goal").into());
            return Err(err);
        }
    }

    Ok(())
}
