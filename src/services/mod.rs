// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod credentials;
pub mod google_auth;
pub mod gtasks;

pub use credentials::{CredentialLookup, CredentialService};
pub use google_auth::GoogleAuthClient;
pub use gtasks::TasksClient;
