use std::sync::Arc;
use std::time::Duration;

use reqwest::{header::CONTENT_TYPE, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use validator::Validate;

use crate::config::Config;
use crate::dto::{HabitRequest, NewEntryRequest};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    AnalyticsResponse, Entry, GoalCompletion, GoalStatus, Habit, HabitId, HabitStats,
    NewGoalCompletion, ResetGoalResponse,
};

/// Bearer-authenticated JSON client for the habits API.
///
/// Cloning is cheap and clones share the session token, so a 401 seen by one
/// clone signs every clone out.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> ClientResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(token)),
        })
    }

    pub fn from_config(config: &Config) -> ClientResult<Self> {
        Self::new(
            &config.api_base_url,
            config.api_token.clone(),
            config.request_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    pub async fn clear_auth(&self) {
        *self.token.write().await = None;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    // ── Habits ───────────────────────────────────────────────────────────

    pub async fn list_habits(&self) -> ClientResult<Vec<Habit>> {
        self.list(self.request(Method::GET, "/habits")).await
    }

    pub async fn get_habit(&self, habit_id: HabitId) -> ClientResult<Habit> {
        self.fetch(self.request(Method::GET, &format!("/habits/{habit_id}")))
            .await
    }

    pub async fn create_habit(&self, body: &HabitRequest) -> ClientResult<Habit> {
        body.validate()?;
        self.fetch(self.request(Method::POST, "/habits").json(body))
            .await
    }

    pub async fn update_habit(
        &self,
        habit_id: HabitId,
        body: &HabitRequest,
    ) -> ClientResult<Habit> {
        body.validate()?;
        self.fetch(
            self.request(Method::PUT, &format!("/habits/{habit_id}"))
                .json(body),
        )
        .await
    }

    pub async fn delete_habit(&self, habit_id: HabitId) -> ClientResult<()> {
        self.execute(self.request(Method::DELETE, &format!("/habits/{habit_id}")))
            .await
    }

    // ── Entries ──────────────────────────────────────────────────────────

    pub async fn list_entries(&self, habit_id: HabitId) -> ClientResult<Vec<Entry>> {
        self.list(self.request(Method::GET, &format!("/habits/{habit_id}/entries")))
            .await
    }

    /// Record a completion. Habits without `multipleUpdate` reject a second
    /// entry on the same day with `ClientError::Conflict`.
    pub async fn create_entry(
        &self,
        habit_id: HabitId,
        body: &NewEntryRequest,
    ) -> ClientResult<Entry> {
        body.validate()?;
        self.fetch(
            self.request(Method::POST, &format!("/habits/{habit_id}/entries"))
                .json(body),
        )
        .await
    }

    pub async fn delete_entry(&self, habit_id: HabitId, entry_id: i64) -> ClientResult<()> {
        self.execute(self.request(
            Method::DELETE,
            &format!("/habits/{habit_id}/entries/{entry_id}"),
        ))
        .await
    }

    pub async fn habit_stats(&self, habit_id: HabitId) -> ClientResult<HabitStats> {
        self.fetch(self.request(Method::GET, &format!("/habits/{habit_id}/stats")))
            .await
    }

    // ── Goals ────────────────────────────────────────────────────────────

    pub async fn goal_completions(&self, habit_id: HabitId) -> ClientResult<Vec<GoalCompletion>> {
        self.list(self.request(
            Method::GET,
            &format!("/habits/{habit_id}/goal-completions"),
        ))
        .await
    }

    pub async fn record_goal_completion(
        &self,
        habit_id: HabitId,
        body: &NewGoalCompletion,
    ) -> ClientResult<GoalCompletion> {
        self.fetch(
            self.request(Method::POST, &format!("/habits/{habit_id}/goal-completions"))
                .json(body),
        )
        .await
    }

    pub async fn check_goal(&self, habit_id: HabitId) -> ClientResult<GoalStatus> {
        self.fetch(self.request(Method::GET, &format!("/habits/{habit_id}/check-goal")))
            .await
    }

    pub async fn reset_goal(&self, habit_id: HabitId) -> ClientResult<ResetGoalResponse> {
        self.fetch(self.request(Method::POST, &format!("/habits/{habit_id}/reset-goal")))
            .await
    }

    // ── Analytics ────────────────────────────────────────────────────────

    /// Aggregated report over the last `period_days` days.
    pub async fn analytics(&self, period_days: u32) -> ClientResult<AnalyticsResponse> {
        if period_days == 0 {
            return Err(ClientError::Validation(
                "Analytics period must be at least one day".into(),
            ));
        }
        self.fetch(
            self.request(Method::GET, "/analytics")
                .query(&[("period", period_days)]),
        )
        .await
    }

    // ── Transport ────────────────────────────────────────────────────────

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// A JSON body is required.
    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<T> {
        self.send(req)
            .await?
            .ok_or_else(|| ClientError::Internal(anyhow::anyhow!("Empty response body")))
    }

    /// The backend encodes an empty list as `null`.
    async fn list<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<Vec<T>> {
        Ok(self
            .send::<Option<Vec<T>>>(req)
            .await?
            .flatten()
            .unwrap_or_default())
    }

    /// Any body is ignored.
    async fn execute(&self, req: RequestBuilder) -> ClientResult<()> {
        self.send::<serde_json::Value>(req).await.map(|_| ())
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<Option<T>> {
        let req = match self.token.read().await.as_deref() {
            Some(token) => req.bearer_auth(token),
            None => req,
        };

        let response = req.send().await.map_err(|e| {
            tracing::error!(error = %e, "API request error");
            ClientError::from(e)
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(url = %response.url(), "Session expired, clearing credentials");
            self.clear_auth().await;
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %body, "API request failed");
            return Err(ClientError::from_status(status, body));
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);
        if !is_json {
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:8080/api/", None, Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(client.url("/habits/3/entries"), "http://localhost:8080/api/habits/3/entries");
    }

    #[tokio::test]
    async fn test_token_lifecycle() {
        let client = ApiClient::new("http://localhost:8080/api", None, Duration::from_secs(5)).unwrap();
        assert!(!client.is_authenticated().await);

        client.set_token("abc").await;
        assert!(client.is_authenticated().await);

        let shared = client.clone();
        shared.clear_auth().await;
        assert!(!client.is_authenticated().await);
    }
}
