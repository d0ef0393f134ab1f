// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Application state and router.

use std::sync::Arc;

use axum::{
	routing::{get, post},
	Router,
};
use roster_server_config::ServerConfig;
use roster_server_identity::IdentityService;
use roster_server_provisioning::ProvisioningService;
use roster_server_store::{CollectionPath, DocumentStore};

use crate::error::ServerError;
use crate::routes;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub identity: Arc<dyn IdentityService>,
	pub store: Arc<dyn DocumentStore>,
	pub provisioning: ProvisioningService,
	/// Collection that receives contact form submissions.
	pub contact_collection: CollectionPath,
}

/// Creates the application state from shared collaborator handles.
pub fn create_app_state(
	identity: Arc<dyn IdentityService>,
	store: Arc<dyn DocumentStore>,
	config: &ServerConfig,
) -> Result<AppState, ServerError> {
	let contact_collection = CollectionPath::root(&config.notify.collection)?;
	let provisioning = ProvisioningService::new(Arc::clone(&identity), Arc::clone(&store));

	Ok(AppState {
		identity,
		store,
		provisioning,
		contact_collection,
	})
}

/// Build the HTTP router. Tracing and CORS layers are added by the binary.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(routes::health::health_check))
		.route(
			"/createCompanyUser",
			post(routes::company_users::create_company_user),
		)
		.route(
			"/contactMessages",
			post(routes::contact::submit_contact_message),
		)
		.with_state(state)
}
