// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth callback route.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/oauth/callback", get(oauth_callback))
}

/// Query parameters Google sends to the redirect URI.
#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

const SUCCESS_PAGE: &str = "<h1>Authentication successful!</h1>\
    <p>You can now go back to WhatsApp and use the bot.</p>";
const FAILURE_PAGE: &str = "<h1>Authentication failed.</h1>\
    <p>Please message the bot again to get a fresh link.</p>";

/// OAuth callback - complete the delegation handshake and store the
/// credential for the phone number carried in the state parameter.
async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<&'static str>) {
    // User declined consent, or Google reported an error
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Google");
        return (StatusCode::BAD_REQUEST, Html(FAILURE_PAGE));
    }

    let (Some(code), Some(oauth_state)) = (params.code, params.state) else {
        tracing::warn!("OAuth callback missing code or state");
        return (StatusCode::BAD_REQUEST, Html(FAILURE_PAGE));
    };

    match state
        .credentials
        .complete_delegation(&code, &oauth_state)
        .await
    {
        Ok(identity) => {
            tracing::info!(identity = %identity, "Delegation callback completed");
            (StatusCode::OK, Html(SUCCESS_PAGE))
        }
        Err(e) => {
            tracing::error!(error = %e, "Delegation callback failed");
            (StatusCode::BAD_REQUEST, Html(FAILURE_PAGE))
        }
    }
}
