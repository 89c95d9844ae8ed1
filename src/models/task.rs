//! Google Tasks API wire types.

use serde::{Deserialize, Serialize};

/// Task creation payload for `tasks.insert`.
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Due date as midnight UTC (`YYYY-MM-DDT00:00:00.000Z`). Google Tasks
    /// records the date portion only.
    pub due: String,
}

/// One task as returned by `tasks.list`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTask {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// RFC 3339 due timestamp; absent for tasks without a due date
    #[serde(default)]
    pub due: Option<String>,
    /// `needsAction` or `completed`
    #[serde(default)]
    pub status: Option<String>,
}

impl ApiTask {
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some("completed")
    }
}

/// Envelope for `tasks.list`. Google omits `items` entirely when the list
/// is empty.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskListResponse {
    #[serde(default)]
    pub items: Vec<ApiTask>,
}
