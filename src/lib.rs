// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! GTasks-Bot: Manage Google Tasks from WhatsApp
//!
//! This crate provides the backend for a WhatsApp bot that maps phone
//! numbers to delegated Google credentials and routes text commands to
//! Google Tasks operations.

pub mod bot;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{CredentialService, TasksClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub credentials: CredentialService,
    pub tasks: TasksClient,
}
