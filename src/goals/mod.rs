pub mod check;
pub mod flow;
pub mod period;
pub mod progress;
pub mod streak;

pub use check::{check_goal_completion, fetch_goal_status};
pub use flow::{AckState, DecisionOutcome, GoalFlow, ResetChoice, Trigger, NOTICE_TTL};
pub use period::{goal_period, goal_window, week_start, GoalWindow};
pub use progress::{
    compute_progress, compute_progress_at, local_goal_status, GoalProgress, ProgressSource,
};
pub use streak::{current_streak, local_stats, longest_streak, running_streak};
