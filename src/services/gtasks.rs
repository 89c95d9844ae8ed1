// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Tasks API client and task operations.
//!
//! Handles:
//! - Task creation with date normalization to midnight UTC
//! - Upcoming-task listing with date-only filtering
//! - Reply rendering for the bot

use chrono::{DateTime, NaiveDate};

use crate::error::AppError;
use crate::models::{ApiTask, Credential, NewTask, TaskListResponse};
use crate::time_utils;

/// Reply sent when nothing is due today or later.
pub const NO_UPCOMING_TASKS: &str = "📭 No upcoming tasks.";

const TASKS_BASE_URL: &str = "https://tasks.googleapis.com/tasks/v1";

/// Every user's default task list.
const DEFAULT_TASKLIST: &str = "@default";

const HTTP_TIMEOUT_SECS: u64 = 30;

/// Google Tasks API client, scoped to the default task list.
#[derive(Clone)]
pub struct TasksClient {
    http: reqwest::Client,
    base_url: String,
}

impl TasksClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            base_url: TASKS_BASE_URL.to_string(),
        }
    }

    /// Point the client at a test server.
    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    // ─── Task Operations ─────────────────────────────────────────────────────

    /// Create a task on the user's default list.
    ///
    /// The due date must be a valid `DD-MM-YYYY` calendar date; it is
    /// normalized to midnight UTC before submission. The title must be
    /// non-empty after trimming. One attempt, no retry.
    pub async fn create_task(
        &self,
        credential: &Credential,
        title: &str,
        notes: &str,
        due_text: &str,
    ) -> Result<(), AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::InvalidFormat(
                "Task title must not be empty".to_string(),
            ));
        }

        let due = time_utils::parse_due_date(due_text)?;

        let notes = notes.trim();
        let task = NewTask {
            title: title.to_string(),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
            due: time_utils::to_midnight_utc(due),
        };

        self.insert_task(&credential.access_token, &task).await
    }

    /// List upcoming tasks as a rendered reply string.
    ///
    /// Fetches all incomplete tasks, keeps those due today (local calendar,
    /// inclusive) or later, and renders one block per task.
    pub async fn list_upcoming_tasks(&self, credential: &Credential) -> Result<String, AppError> {
        let response = self.fetch_tasks(&credential.access_token).await?;
        let today = chrono::Local::now().date_naive();
        Ok(render_upcoming(&response.items, today))
    }

    // ─── Wire Calls ──────────────────────────────────────────────────────────

    async fn insert_task(&self, access_token: &str, task: &NewTask) -> Result<(), AppError> {
        let url = format!("{}/lists/{}/tasks", self.base_url, DEFAULT_TASKLIST);

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(task)
            .send()
            .await
            .map_err(|e| AppError::TasksApi(e.to_string()))?;

        self.check_response(response).await
    }

    async fn fetch_tasks(&self, access_token: &str) -> Result<TaskListResponse, AppError> {
        let url = format!("{}/lists/{}/tasks", self.base_url, DEFAULT_TASKLIST);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("showCompleted", "false")])
            .send()
            .await
            .map_err(|e| AppError::TasksApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Google Tasks list failed");
            return Err(AppError::TasksApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::TasksApi(format!("JSON parse error: {}", e)))
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, body = %body, "Google Tasks call failed");
        Err(AppError::TasksApi(format!("HTTP {}: {}", status, body)))
    }
}

impl Default for TasksClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the upcoming-task reply from a fetched task list.
///
/// Tasks without a parseable due date are skipped. Blocks are ordered by
/// the rendered `DD-MM-YYYY` date string, not calendar order, so a
/// `05-01-2026` task lists before `28-12-2025`.
fn render_upcoming(tasks: &[ApiTask], today: NaiveDate) -> String {
    let mut blocks: Vec<(String, String)> = Vec::new();

    for task in tasks {
        // The list request already excludes completed tasks; this guards
        // against a provider that returns them anyway.
        if task.is_completed() {
            continue;
        }
        let Some(due_raw) = task.due.as_deref() else {
            continue;
        };
        let Ok(due) = DateTime::parse_from_rfc3339(due_raw) else {
            tracing::debug!(due = due_raw, "Skipping task with unparseable due date");
            continue;
        };

        let due_date = due.date_naive();
        if due_date < today {
            continue;
        }

        let date_text = time_utils::format_user_date(due_date);
        let notes = task.notes.as_deref().unwrap_or_default();
        let block = format!("📝 *{}*\n📅 {}\n🧾 {}", task.title, date_text, notes);
        blocks.push((date_text, block));
    }

    blocks.sort_by(|a, b| a.0.cmp(&b.0));

    if blocks.is_empty() {
        return NO_UPCOMING_TASKS.to_string();
    }

    blocks
        .into_iter()
        .map(|(_, block)| block)
        .collect::<Vec<_>>()
        .join("\n\n")
}
