use std::sync::Arc;

use tokio::sync::Mutex;

use habit_tracker_client::goals::GoalFlow;
use habit_tracker_client::overview::load_overview;
use habit_tracker_client::reminders::{LogNotifier, ReminderScheduler};
use habit_tracker_client::worker::spawn_refresh_worker;
use habit_tracker_client::{ApiClient, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "habit_tracker_client=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env()?;
    let api = ApiClient::from_config(&config)?;
    if !api.is_authenticated().await {
        anyhow::bail!("API_TOKEN is not set");
    }

    let notifier = Arc::new(LogNotifier::new(config.notification_permission()));
    let scheduler = ReminderScheduler::new(notifier);
    let flow = Arc::new(Mutex::new(GoalFlow::new()));

    tracing::info!(
        api = %api.base_url(),
        refresh_secs = config.refresh_interval_secs,
        permission = ?scheduler.permission_status(),
        "Habit tracker client starting"
    );

    let habits = api.list_habits().await?;
    for row in load_overview(&api, &habits).await? {
        tracing::info!(
            habit_id = row.habit.id,
            habit = %row.habit.name,
            entries = row.entry_count,
            streak = row.stats.current_streak,
            progress = ?row.progress.as_ref().map(|p| p.rounded_percentage()),
            label = row.progress.as_ref().map(|p| p.label).unwrap_or("no goal"),
            "Habit overview"
        );
    }

    // Worker's first tick arms reminders and runs the goal sweep
    let worker = spawn_refresh_worker(
        api.clone(),
        scheduler.clone(),
        flow.clone(),
        config.refresh_interval(),
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    worker.abort();
    scheduler.cancel_all().await;

    for (habit_id, state) in flow.lock().await.pending() {
        tracing::info!(habit_id, state = ?state, "Goal acknowledgment left open");
    }

    Ok(())
}
