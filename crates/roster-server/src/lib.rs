// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Roster server.
//!
//! Serves the company user provisioning call and contact form intake, and
//! runs the contact notification trigger.

pub mod api;
pub mod api_response;
pub mod auth;
pub mod bootstrap;
pub mod contacts;
pub mod error;
pub mod routes;

pub use api::{create_app_state, create_router, AppState};
pub use bootstrap::{build_dispatcher, build_services, open_identity, open_store, Services};
pub use contacts::{list_contacts, ContactSummary};
pub use error::ServerError;
pub use roster_server_config::ServerConfig;
