// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook route for inbound WhatsApp messages (Twilio form POST).

use crate::bot;
use crate::AppState;
use axum::{
    extract::{Form, State},
    http::header,
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhook", post(handle_inbound))
}

/// Twilio WhatsApp webhook form fields (the subset we use).
#[derive(Deserialize)]
struct InboundMessage {
    #[serde(rename = "From", default)]
    from: String,
    #[serde(rename = "Body", default)]
    body: String,
}

/// Handle an inbound message (POST).
///
/// Always answers 200 with a TwiML reply; every failure has already been
/// converted to reply text by the dispatcher.
async fn handle_inbound(
    State(state): State<Arc<AppState>>,
    Form(message): Form<InboundMessage>,
) -> impl IntoResponse {
    let reply = bot::handle_message(&state.credentials, &state.tasks, &message.from, &message.body)
        .await;

    ([(header::CONTENT_TYPE, "text/xml")], twiml_message(&reply))
}

/// Wrap a reply string in a TwiML message response.
fn twiml_message(text: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape_xml(text)
    )
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
