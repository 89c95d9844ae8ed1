// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Inbound message dispatcher.
//!
//! Single-turn command interpreter: every message is classified on its
//! own, handled against the user's credential, and answered with exactly
//! one reply string. No conversation state survives between messages.

use crate::error::AppError;
use crate::models::PhoneNumber;
use crate::services::{CredentialLookup, CredentialService, TasksClient};

pub const REPLY_EMPTY: &str = "Empty message. Type `hi` to see available commands.";
pub const REPLY_AUTH_FAILED: &str = "❌ Failed to authenticate. Please try again.";
pub const REPLY_GREETING: &str =
    "You're authenticated. You can type:\n- `add task`\n- `list tasks`";
pub const REPLY_ADD_TASK_USAGE: &str =
    "Please send task details in the format:\n`Title | Description | DD-MM-YYYY`";
pub const REPLY_INVALID_FORMAT: &str =
    "Invalid format. Please use:\nTitle | Description | DD-MM-YYYY";
pub const REPLY_UNKNOWN: &str = "Unknown command. Please type `add task` or `list tasks`.";
pub const REPLY_TASK_ADDED: &str = "✅ Task added successfully!";
pub const REPLY_INVALID_DATE: &str = "❌ Invalid due date. Please use DD-MM-YYYY.";
pub const REPLY_ADD_FAILED: &str = "❌ Failed to add task. Please try again.";
pub const REPLY_LIST_FAILED: &str = "❌ Failed to fetch tasks.";

/// One classified inbound message. Classification is total: every input
/// string maps to exactly one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Whitespace-only message
    Empty,
    /// Exact `hi` (case-insensitive)
    Greeting,
    /// Exact `add task`: show the format, create nothing
    AddTaskUsage,
    /// Exact `list tasks`
    ListTasks,
    /// Pipe-delimited line with exactly three fields
    AddTask {
        title: String,
        notes: String,
        due: String,
    },
    /// Pipe present but the wrong number of fields
    Malformed,
    /// Everything else
    Unknown,
}

/// Classify one message.
///
/// The three literal commands are matched before the delimiter rule, so a
/// message that is exactly `hi`, `add task`, or `list tasks` can never be
/// read as a task line (accepted limitation: those strings cannot be task
/// titles when sent alone).
pub fn parse_command(text: &str) -> Command {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }

    match trimmed.to_lowercase().as_str() {
        "hi" => return Command::Greeting,
        "add task" => return Command::AddTaskUsage,
        "list tasks" => return Command::ListTasks,
        _ => {}
    }

    if trimmed.contains('|') {
        let parts: Vec<&str> = trimmed.split('|').collect();
        if parts.len() == 3 {
            return Command::AddTask {
                title: parts[0].trim().to_string(),
                notes: parts[1].trim().to_string(),
                due: parts[2].trim().to_string(),
            };
        }
        return Command::Malformed;
    }

    Command::Unknown
}

/// Handle one inbound message and produce the reply text.
///
/// Never returns an error: every failure is logged and converted to a
/// user-facing reply here, at the component boundary.
pub async fn handle_message(
    credentials: &CredentialService,
    tasks: &TasksClient,
    from_raw: &str,
    body: &str,
) -> String {
    let command = parse_command(body);
    if command == Command::Empty {
        return REPLY_EMPTY.to_string();
    }

    let Some(identity) = PhoneNumber::normalize(from_raw) else {
        tracing::warn!(from = from_raw, "Unusable sender field on inbound message");
        return REPLY_AUTH_FAILED.to_string();
    };

    tracing::info!(identity = %identity, "Received message");

    let credential = match credentials.usable_credential(&identity).await {
        Ok(CredentialLookup::Usable(credential)) => credential,
        Ok(CredentialLookup::NeedsDelegation) => {
            return match credentials.begin_delegation(&identity) {
                Ok(url) => format!("🔐 Please authenticate using this link:\n{}", url),
                Err(e) => {
                    tracing::error!(identity = %identity, error = %e, "Failed to build auth URL");
                    REPLY_AUTH_FAILED.to_string()
                }
            };
        }
        Err(e) => {
            // ReAuthRequired and CorruptCredential both end here, but each
            // is logged under its own cause for diagnosis.
            tracing::warn!(identity = %identity, error = %e, "Credential lookup failed");
            return REPLY_AUTH_FAILED.to_string();
        }
    };

    match command {
        Command::Empty => REPLY_EMPTY.to_string(),
        Command::Greeting => REPLY_GREETING.to_string(),
        Command::AddTaskUsage => REPLY_ADD_TASK_USAGE.to_string(),
        Command::Malformed => REPLY_INVALID_FORMAT.to_string(),
        Command::Unknown => REPLY_UNKNOWN.to_string(),
        Command::ListTasks => match tasks.list_upcoming_tasks(&credential).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(identity = %identity, error = %e, "Listing tasks failed");
                REPLY_LIST_FAILED.to_string()
            }
        },
        Command::AddTask { title, notes, due } => {
            match tasks.create_task(&credential, &title, &notes, &due).await {
                Ok(()) => REPLY_TASK_ADDED.to_string(),
                Err(AppError::InvalidDate(input)) => {
                    tracing::info!(identity = %identity, input = %input, "Rejected due date");
                    REPLY_INVALID_DATE.to_string()
                }
                Err(AppError::InvalidFormat(_)) => REPLY_INVALID_FORMAT.to_string(),
                Err(e) => {
                    tracing::error!(identity = %identity, error = %e, "Task creation failed");
                    REPLY_ADD_FAILED.to_string()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::Credential;
    use crate::services::GoogleAuthClient;
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // ─── Grammar ─────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_literals_case_insensitive() {
        assert_eq!(parse_command("hi"), Command::Greeting);
        assert_eq!(parse_command("Hi"), Command::Greeting);
        assert_eq!(parse_command("ADD TASK"), Command::AddTaskUsage);
        assert_eq!(parse_command("List Tasks"), Command::ListTasks);
        assert_eq!(parse_command("  list tasks  "), Command::ListTasks);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_command(""), Command::Empty);
        assert_eq!(parse_command("   \n "), Command::Empty);
    }

    #[test]
    fn test_parse_task_line() {
        assert_eq!(
            parse_command("Launch | Ship v1 | 01-03-2025"),
            Command::AddTask {
                title: "Launch".to_string(),
                notes: "Ship v1".to_string(),
                due: "01-03-2025".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_wrong_field_count_is_malformed() {
        assert_eq!(parse_command("Launch | 01-03-2025"), Command::Malformed);
        assert_eq!(parse_command("a | b | c | d"), Command::Malformed);
        assert_eq!(parse_command("|"), Command::Malformed);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse_command("hello there"), Command::Unknown);
        assert_eq!(parse_command("add tasks"), Command::Unknown);
    }

    #[test]
    fn test_parse_literal_wins_over_delimiter_only_for_exact_text() {
        // A pipe line whose first field happens to be "hi" is still a task
        assert_eq!(
            parse_command("hi | there | 01-01-2025"),
            Command::AddTask {
                title: "hi".to_string(),
                notes: "there".to_string(),
                due: "01-01-2025".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_is_total() {
        // Nothing panics, everything classifies
        for input in [
            "", " ", "hi", "HI", "add task", "list tasks", "a|b", "a|b|c",
            "a|b|c|d", "🎉", "task without pipes", "|||", "\thi\t",
        ] {
            let _ = parse_command(input);
        }
    }

    // ─── Message Handling ────────────────────────────────────────────────────

    fn fresh_credential() -> Credential {
        Credential {
            access_token: "fresh-access".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Utc::now() + Duration::hours(1),
            scopes: vec!["https://www.googleapis.com/auth/tasks".to_string()],
        }
    }

    fn phone() -> PhoneNumber {
        PhoneNumber::normalize("15551234567").unwrap()
    }

    async fn services(
        server: &MockServer,
        stored: Option<&Credential>,
    ) -> (CredentialService, TasksClient) {
        let mut store = MemoryStore::new();
        if let Some(cred) = stored {
            store = store.with_entry(&phone(), &cred.to_blob().unwrap());
        }
        let auth = GoogleAuthClient::new(
            "client-id".to_string(),
            "client-secret".to_string(),
            "https://bot.example.com/oauth/callback".to_string(),
            b"test_state_key".to_vec(),
        );
        let credentials = CredentialService::new(Arc::new(store), auth);
        let tasks = TasksClient::new().with_base_url(server.uri());
        (credentials, tasks)
    }

    #[tokio::test]
    async fn test_empty_body_replies_empty() {
        let server = MockServer::start().await;
        let (credentials, tasks) = services(&server, None).await;

        let reply = handle_message(&credentials, &tasks, "whatsapp:+15551234567", "  ").await;
        assert_eq!(reply, REPLY_EMPTY);
    }

    #[tokio::test]
    async fn test_unauthenticated_user_gets_delegation_link() {
        let server = MockServer::start().await;
        let (credentials, tasks) = services(&server, None).await;

        let reply = handle_message(&credentials, &tasks, "whatsapp:+15551234567", "hi").await;
        assert!(reply.contains("Please authenticate"));
        assert!(reply.contains("https://accounts.google.com/o/oauth2/auth?"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_credential_replies_auth_failed() {
        let server = MockServer::start().await;
        let store = MemoryStore::new().with_entry(&phone(), "garbage");
        let auth = GoogleAuthClient::new(
            "client-id".to_string(),
            "client-secret".to_string(),
            "https://bot.example.com/oauth/callback".to_string(),
            b"test_state_key".to_vec(),
        );
        let credentials = CredentialService::new(Arc::new(store), auth);
        let tasks = TasksClient::new().with_base_url(server.uri());

        let reply = handle_message(&credentials, &tasks, "+15551234567", "hi").await;
        assert_eq!(reply, REPLY_AUTH_FAILED);
    }

    #[tokio::test]
    async fn test_greeting_with_fresh_credential() {
        let server = MockServer::start().await;
        let (credentials, tasks) = services(&server, Some(&fresh_credential())).await;

        let reply = handle_message(&credentials, &tasks, "+15551234567", "Hi").await;
        assert_eq!(reply, REPLY_GREETING);
    }

    #[tokio::test]
    async fn test_add_task_literal_shows_usage_without_task_call() {
        let server = MockServer::start().await;
        let (credentials, tasks) = services(&server, Some(&fresh_credential())).await;

        let reply = handle_message(&credentials, &tasks, "+15551234567", "add task").await;
        assert_eq!(reply, REPLY_ADD_TASK_USAGE);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_task_line_creates_task_and_confirms() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lists/@default/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "task-1",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (credentials, tasks) = services(&server, Some(&fresh_credential())).await;

        let reply = handle_message(
            &credentials,
            &tasks,
            "whatsapp:+15551234567",
            "Launch | Ship v1 | 01-03-2025",
        )
        .await;
        assert_eq!(reply, REPLY_TASK_ADDED);

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["title"], "Launch");
        assert_eq!(body["notes"], "Ship v1");
        assert_eq!(body["due"], "2025-03-01T00:00:00.000Z");
    }

    #[tokio::test]
    async fn test_task_line_with_bad_date_replies_invalid_date() {
        let server = MockServer::start().await;
        let (credentials, tasks) = services(&server, Some(&fresh_credential())).await;

        let reply = handle_message(
            &credentials,
            &tasks,
            "+15551234567",
            "Launch | Ship v1 | 31-02-2025",
        )
        .await;
        assert_eq!(reply, REPLY_INVALID_DATE);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_task_line_replies_invalid_format() {
        let server = MockServer::start().await;
        let (credentials, tasks) = services(&server, Some(&fresh_credential())).await;

        let reply = handle_message(&credentials, &tasks, "+15551234567", "only | two").await;
        assert_eq!(reply, REPLY_INVALID_FORMAT);
    }

    #[tokio::test]
    async fn test_list_tasks_renders_reply() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lists/@default/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let (credentials, tasks) = services(&server, Some(&fresh_credential())).await;

        let reply = handle_message(&credentials, &tasks, "+15551234567", "list tasks").await;
        assert_eq!(reply, crate::services::gtasks::NO_UPCOMING_TASKS);
    }

    #[tokio::test]
    async fn test_remote_fault_replies_add_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lists/@default/tasks"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (credentials, tasks) = services(&server, Some(&fresh_credential())).await;

        let reply = handle_message(
            &credentials,
            &tasks,
            "+15551234567",
            "Launch | Ship v1 | 01-03-2025",
        )
        .await;
        assert_eq!(reply, REPLY_ADD_FAILED);
    }

    #[tokio::test]
    async fn test_unknown_command_replies_unknown() {
        let server = MockServer::start().await;
        let (credentials, tasks) = services(&server, Some(&fresh_credential())).await;

        let reply = handle_message(&credentials, &tasks, "+15551234567", "what's up").await;
        assert_eq!(reply, REPLY_UNKNOWN);
    }
}
