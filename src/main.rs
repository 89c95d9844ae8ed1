// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GTasks-Bot API Server
//!
//! WhatsApp bot that lets users manage their Google Tasks by text:
//! authenticate once via OAuth, then add and list tasks from chat.

use gtasks_bot::{
    config::Config,
    db::FirestoreStore,
    services::{CredentialService, GoogleAuthClient, TasksClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting GTasks-Bot API");

    // Initialize Firestore credential store
    let store = FirestoreStore::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize Google OAuth client and credential lifecycle service
    let auth = GoogleAuthClient::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        config.redirect_uri(),
        config.oauth_state_key.clone(),
    );
    let credentials = CredentialService::new(Arc::new(store), auth);
    tracing::info!(redirect_uri = %config.redirect_uri(), "Credential service initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        credentials,
        tasks: TasksClient::new(),
    });

    // Build router
    let app = gtasks_bot::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gtasks_bot=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
