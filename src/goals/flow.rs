use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use super::check::fetch_goal_status;
use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    GoalCompletion, GoalStatus, Habit, HabitId, NewGoalCompletion, ResetGoalResponse,
};

/// How long a failure notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Where a habit is in the acknowledgment flow.
#[derive(Debug, Clone, PartialEq)]
pub enum AckState {
    Idle,
    /// Idle, but already evaluated this session.
    Checked,
    /// Goal met and not yet acknowledged; waiting for `submit` or `dismiss`.
    CompletionPrompt { status: GoalStatus },
    /// Completion recorded; waiting for `decide`.
    ResetDecision { status: GoalStatus },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Background sweep. Each habit is looked at once per session.
    Periodic,
    /// Right after the user logged an entry.
    AfterCompletion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetChoice {
    /// Clear the period's entries and start over.
    Reset,
    KeepCompleted,
}

#[derive(Debug)]
pub enum DecisionOutcome {
    Kept,
    Reset {
        response: ResetGoalResponse,
        /// Fresh goal status, if the re-check succeeded.
        status: Option<GoalStatus>,
        /// Fresh habit list, if the reload succeeded.
        habits: Option<Vec<Habit>>,
    },
}

#[derive(Debug, Clone)]
struct Notice {
    message: String,
    expires_at: Instant,
}

/// Two-step acknowledgment of met goals: record the completion, then decide
/// whether to reset the period.
///
/// One state per habit, so a habit can never sit in two steps at once.
#[derive(Debug, Default)]
pub struct GoalFlow {
    states: HashMap<HabitId, AckState>,
    notice: Option<Notice>,
}

impl GoalFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, habit_id: HabitId) -> AckState {
        self.states.get(&habit_id).cloned().unwrap_or(AckState::Idle)
    }

    /// Habits currently waiting on the user, with the status that got them
    /// there.
    pub fn pending(&self) -> Vec<(HabitId, &AckState)> {
        let mut pending: Vec<_> = self
            .states
            .iter()
            .filter(|(_, s)| {
                matches!(s, AckState::CompletionPrompt { .. } | AckState::ResetDecision { .. })
            })
            .map(|(id, s)| (*id, s))
            .collect();
        pending.sort_by_key(|(id, _)| *id);
        pending
    }

    /// Current failure notice, until it expires.
    pub fn notice(&self) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|n| Instant::now() < n.expires_at)
            .map(|n| n.message.as_str())
    }

    /// Evaluate a habit's goal. Returns true when it moved to the completion
    /// prompt.
    pub async fn check(&mut self, api: &ApiClient, habit: &Habit, trigger: Trigger) -> bool {
        let previous = match (self.state(habit.id), trigger) {
            (state @ AckState::Idle, _) | (state @ AckState::Checked, Trigger::AfterCompletion) => {
                state
            }
            _ => return false,
        };

        self.states.insert(habit.id, AckState::Checked);

        // A failed request leaves the habit as it was so the next sweep retries.
        let status = match fetch_goal_status(api, habit).await {
            Ok(Some(status)) => status,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(habit_id = habit.id, error = %e, "Goal check failed, will retry");
                self.states.insert(habit.id, previous);
                return false;
            }
        };

        if !status.needs_renewal {
            return false;
        }

        tracing::info!(
            habit_id = habit.id,
            goal_type = %status.goal_type,
            actual = status.actual_count,
            target = status.target_count,
            "Goal met, prompting for acknowledgment"
        );
        self.states.insert(habit.id, AckState::CompletionPrompt { status });
        true
    }

    /// Record the goal completion. On failure the prompt stays open.
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        habit_id: HabitId,
        notes: &str,
    ) -> ClientResult<GoalCompletion> {
        let status = match self.state(habit_id) {
            AckState::CompletionPrompt { status } => status,
            other => return Err(wrong_state(habit_id, "submit", &other)),
        };

        let body = NewGoalCompletion::from_status(&status, notes);
        match api.record_goal_completion(habit_id, &body).await {
            Ok(completion) => {
                tracing::info!(habit_id, completion_id = completion.id, "Goal completion recorded");
                self.states.insert(habit_id, AckState::ResetDecision { status });
                Ok(completion)
            }
            Err(e) => {
                tracing::error!(habit_id, error = %e, "Failed to record goal completion");
                self.set_notice(e.user_message());
                Err(e)
            }
        }
    }

    /// Close the prompt without recording anything.
    pub fn dismiss(&mut self, habit_id: HabitId) -> ClientResult<()> {
        match self.state(habit_id) {
            AckState::CompletionPrompt { .. } => {
                self.states.insert(habit_id, AckState::Checked);
                Ok(())
            }
            other => Err(wrong_state(habit_id, "dismiss", &other)),
        }
    }

    pub async fn decide(
        &mut self,
        api: &ApiClient,
        habit_id: HabitId,
        choice: ResetChoice,
    ) -> ClientResult<DecisionOutcome> {
        let status = match self.state(habit_id) {
            AckState::ResetDecision { status } => status,
            other => return Err(wrong_state(habit_id, "decide", &other)),
        };

        if choice == ResetChoice::KeepCompleted {
            self.states.insert(habit_id, AckState::Idle);
            return Ok(DecisionOutcome::Kept);
        }

        let response = match api.reset_goal(habit_id).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(habit_id, error = %e, "Failed to reset goal");
                self.set_notice(e.user_message());
                return Err(e);
            }
        };
        tracing::info!(
            habit_id,
            goal_type = %status.goal_type,
            deleted = response.deleted_records,
            "Goal period reset"
        );
        self.states.insert(habit_id, AckState::Idle);

        let (status, habits) = tokio::join!(api.check_goal(habit_id), api.list_habits());
        let status = status
            .map_err(|e| {
                tracing::warn!(habit_id, error = %e, "Goal status refresh failed after reset")
            })
            .ok();
        let habits = habits
            .map_err(|e| tracing::warn!(error = %e, "Habit reload failed after reset"))
            .ok();

        Ok(DecisionOutcome::Reset {
            response,
            status,
            habits,
        })
    }

    /// Forget a habit entirely, e.g. after it was deleted.
    pub fn forget(&mut self, habit_id: HabitId) {
        self.states.remove(&habit_id);
    }

    fn set_notice(&mut self, message: String) {
        self.notice = Some(Notice {
            message,
            expires_at: Instant::now() + NOTICE_TTL,
        });
    }
}

fn wrong_state(habit_id: HabitId, action: &str, state: &AckState) -> ClientError {
    ClientError::InvalidState(format!("Cannot {action} habit {habit_id} while {state:?}"))
}
