//! In-process stand-in for the habits backend.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use habit_tracker_client::ApiClient;

pub const TOKEN: &str = "test-token";

#[derive(Default)]
pub struct MockState {
    pub habits: Mutex<Vec<Value>>,
    pub entries: Mutex<Vec<Value>>,
    pub goal_status: Mutex<HashMap<i64, Value>>,
    pub completions: Mutex<Vec<Value>>,
    pub fail_goal_completion: AtomicBool,
    pub fail_reset: AtomicBool,
    pub fail_stats: AtomicBool,
    pub fail_check_goal: AtomicBool,
    pub analytics_period: Mutex<Option<String>>,
    pub check_goal_calls: AtomicUsize,
    pub reset_calls: AtomicUsize,
    next_id: AtomicI64,
}

impl MockState {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 100
    }

    pub fn seed_habit(&self, habit: Value) {
        self.habits.lock().unwrap().push(habit);
    }

    pub fn seed_entry(&self, habit_id: i64, completed_at: &str) {
        let id = self.next_id();
        self.entries.lock().unwrap().push(json!({
            "id": id,
            "habit_id": habit_id,
            "completed_at": completed_at,
            "notes": "",
        }));
    }

    pub fn set_goal_status(&self, habit_id: i64, status: Value) {
        self.goal_status.lock().unwrap().insert(habit_id, status);
    }

    pub fn check_goal_calls(&self) -> usize {
        self.check_goal_calls.load(Ordering::SeqCst)
    }

    fn habit(&self, id: i64) -> Option<Value> {
        self.habits
            .lock()
            .unwrap()
            .iter()
            .find(|h| h["id"] == id)
            .cloned()
    }

    fn entries_for(&self, habit_id: i64) -> Vec<Value> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e["habit_id"] == habit_id)
            .cloned()
            .collect()
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url, Some(TOKEN.into()), Duration::from_secs(5)).unwrap()
    }
}

pub fn habit_json(id: i64, name: &str, goal: i32, goal_type: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": null,
        "is_active": true,
        "multipleUpdate": false,
        "goal": goal,
        "goal_type": goal_type,
        "reminder_enabled": false,
        "reminder_times": null,
        "visibility": "private",
        "created_at": "2026-10-01T12:00:00Z",
    })
}

pub fn met_status(goal_type: &str, actual: i32, target: i32) -> Value {
    json!({
        "has_goal": true,
        "goal_completed": true,
        "needs_renewal": true,
        "already_recorded": false,
        "actual_count": actual,
        "target_count": target,
        "goal_type": goal_type,
        "period_start": "2026-10-11T00:00:00Z",
        "period_end": "2026-10-17T23:59:59Z",
    })
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/habits", get(list_habits).post(create_habit))
        .route(
            "/api/habits/:id",
            get(get_habit).put(update_habit).delete(delete_habit),
        )
        .route("/api/habits/:id/entries", get(list_entries).post(create_entry))
        .route("/api/habits/:id/entries/:entry_id", delete(delete_entry))
        .route("/api/habits/:id/stats", get(stats))
        .route("/api/habits/:id/check-goal", get(check_goal))
        .route(
            "/api/habits/:id/goal-completions",
            get(list_completions).post(create_completion),
        )
        .route("/api/habits/:id/reset-goal", post(reset_goal))
        .route("/api/analytics", get(analytics))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state)
}

async fn require_bearer(
    State(_state): State<Arc<MockState>>,
    req: Request,
    next: Next,
) -> Response {
    let authorized = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map_or(false, |token| token == TOKEN);

    if !authorized {
        return (StatusCode::UNAUTHORIZED, "Unauthorized\n").into_response();
    }
    next.run(req).await
}

/// Empty lists go out as `null`, like the real backend.
fn list_or_null(items: Vec<Value>) -> Json<Value> {
    if items.is_empty() {
        Json(Value::Null)
    } else {
        Json(Value::Array(items))
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Habit not found\n").into_response()
}

async fn list_habits(State(state): State<Arc<MockState>>) -> Json<Value> {
    list_or_null(state.habits.lock().unwrap().clone())
}

async fn create_habit(
    State(state): State<Arc<MockState>>,
    Json(mut body): Json<Value>,
) -> Response {
    body["id"] = json!(state.next_id());
    body["created_at"] = json!(Utc::now());
    state.seed_habit(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn get_habit(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Response {
    match state.habit(id) {
        Some(habit) => Json(habit).into_response(),
        None => not_found(),
    }
}

async fn update_habit(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut habits = state.habits.lock().unwrap();
    match habits.iter_mut().find(|h| h["id"] == id) {
        Some(habit) => {
            body["id"] = json!(id);
            *habit = body.clone();
            Json(body).into_response()
        }
        None => not_found(),
    }
}

async fn delete_habit(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> StatusCode {
    state.habits.lock().unwrap().retain(|h| h["id"] != id);
    StatusCode::NO_CONTENT
}

async fn list_entries(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Json<Value> {
    list_or_null(state.entries_for(id))
}

async fn create_entry(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let Some(habit) = state.habit(id) else {
        return not_found();
    };

    let completed_at: DateTime<Utc> = body["completed_at"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(Utc::now);

    let multiple = habit["multipleUpdate"].as_bool().unwrap_or(false);
    let same_day = state.entries_for(id).iter().any(|e| {
        e["completed_at"]
            .as_str()
            .and_then(|s| s.parse::<DateTime<Utc>>().ok())
            .map_or(false, |at| at.date_naive() == completed_at.date_naive())
    });
    if !multiple && same_day {
        return (StatusCode::CONFLICT, "Habit already completed today\n").into_response();
    }

    let entry = json!({
        "id": state.next_id(),
        "habit_id": id,
        "completed_at": completed_at,
        "notes": body["notes"],
    });
    state.entries.lock().unwrap().push(entry.clone());
    (StatusCode::CREATED, Json(entry)).into_response()
}

async fn delete_entry(
    State(state): State<Arc<MockState>>,
    Path((id, entry_id)): Path<(i64, i64)>,
) -> StatusCode {
    state
        .entries
        .lock()
        .unwrap()
        .retain(|e| !(e["habit_id"] == id && e["id"] == entry_id));
    StatusCode::NO_CONTENT
}

async fn stats(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Response {
    if state.fail_stats.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Error calculating stats\n").into_response();
    }
    Json(json!({
        "habit_id": id,
        "total_count": state.entries_for(id).len(),
        "current_streak": 0,
        "longest_streak": 0,
    }))
    .into_response()
}

async fn check_goal(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Response {
    state.check_goal_calls.fetch_add(1, Ordering::SeqCst);
    if state.fail_check_goal.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Error checking goal\n").into_response();
    }
    let status = state
        .goal_status
        .lock()
        .unwrap()
        .get(&id)
        .cloned()
        .unwrap_or_else(|| json!({ "has_goal": false }));
    Json(status).into_response()
}

async fn list_completions(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Json<Value> {
    let items = state
        .completions
        .lock()
        .unwrap()
        .iter()
        .filter(|c| c["habit_id"] == id)
        .cloned()
        .collect();
    list_or_null(items)
}

async fn create_completion(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if state.fail_goal_completion.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Error creating goal completion\n").into_response();
    }

    let completion = json!({
        "id": state.next_id(),
        "habit_id": id,
        "goal_type": body["goal_type"],
        "goal_value": body["goal_value"],
        "period_start": body.get("period_start").cloned().unwrap_or_else(|| json!(Utc::now())),
        "period_end": body.get("period_end").cloned().unwrap_or_else(|| json!(Utc::now())),
        "actual_count": body["actual_count"],
        "notes": body["notes"],
        "completed_at": Utc::now(),
    });
    state.completions.lock().unwrap().push(completion.clone());

    if let Some(status) = state.goal_status.lock().unwrap().get_mut(&id) {
        status["needs_renewal"] = json!(false);
        status["already_recorded"] = json!(true);
    }
    (StatusCode::CREATED, Json(completion)).into_response()
}

async fn reset_goal(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Response {
    state.reset_calls.fetch_add(1, Ordering::SeqCst);
    if state.fail_reset.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Error resetting goal\n").into_response();
    }

    let deleted = {
        let mut entries = state.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| e["habit_id"] != id);
        before - entries.len()
    };

    let mut statuses = state.goal_status.lock().unwrap();
    let (start, end) = match statuses.get_mut(&id) {
        Some(status) => {
            status["actual_count"] = json!(0);
            status["goal_completed"] = json!(false);
            status["needs_renewal"] = json!(false);
            status["already_recorded"] = json!(false);
            (status["period_start"].clone(), status["period_end"].clone())
        }
        None => (Value::Null, Value::Null),
    };

    Json(json!({
        "message": "Goal reset successfully",
        "period_start": start,
        "period_end": end,
        "deleted_records": deleted,
    }))
    .into_response()
}

/// Fixed report; empty lists go out as `null`.
async fn analytics(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    *state.analytics_period.lock().unwrap() = params.get("period").cloned();
    Json(json!({
        "overview": {
            "total_habits": 2,
            "active_habits": 1,
            "total_entries": 9,
            "current_streak": 3,
            "longest_streak": 5,
            "completion_rate": 42.5,
            "weekly_progress": 57.1,
            "monthly_progress": 42.5,
        },
        "habit_trends": [
            {
                "habit_id": 1,
                "habit_name": "Run",
                "category": "health",
                "total_count": 8,
                "weekly_count": 3,
                "trend": "up",
            },
            {
                "habit_id": 2,
                "habit_name": "Read",
                "category": "",
                "total_count": 1,
                "weekly_count": 0,
                "trend": "sideways",
            },
        ],
        "activity_calendar": [
            { "date": "2026-10-15", "count": 2, "level": 2 },
            { "date": "2026-10-16", "count": 1, "level": 1 },
        ],
        "weekly_stats": null,
        "category_stats": [
            {
                "category": "health",
                "habit_count": 1,
                "completed": 8,
                "total": 14,
                "completion_rate": 57.14,
            },
        ],
    }))
}
