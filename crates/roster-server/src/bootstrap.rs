// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Process-start wiring.
//!
//! Every shared handle (identity service, document store, mailer) is built
//! once here and then shared by reference with all handlers.

use std::sync::Arc;
use std::time::Duration;

use roster_server_config::{DatabaseConfig, ServerConfig, SmtpConfig, TlsMode};
use roster_server_identity::{IdentityService, SqliteIdentityService};
use roster_server_notify::ContactNotifier;
use roster_server_smtp::{self as smtp, Mailer, SmtpClient};
use roster_server_store::{
	channel, create_pool, CollectionPath, DocumentStore, EventReceiver, PoolSettings,
	SqliteDocumentStore, TriggerDispatcher,
};
use tracing::{info, warn};

use crate::api::{create_app_state, AppState};
use crate::error::ServerError;

/// A wired server, ready to spawn its dispatcher and serve.
pub struct Services {
	pub state: AppState,
	pub dispatcher: TriggerDispatcher,
}

/// Pool settings for the configured database.
pub fn pool_settings(config: &DatabaseConfig) -> PoolSettings {
	PoolSettings {
		url: config.url.clone(),
		max_connections: config.max_connections,
		busy_timeout: Duration::from_secs(config.busy_timeout_secs),
	}
}

/// Open the identity database and apply its migrations.
pub async fn open_identity(config: &ServerConfig) -> Result<SqliteIdentityService, ServerError> {
	let pool = create_pool(&pool_settings(&config.database)).await?;
	let identity = SqliteIdentityService::new(pool);
	identity.migrate().await?;
	Ok(identity)
}

/// Open the document store without creation events, for offline commands.
pub async fn open_store(config: &ServerConfig) -> Result<SqliteDocumentStore, ServerError> {
	let pool = create_pool(&pool_settings(&config.database)).await?;
	let store = SqliteDocumentStore::new(pool);
	store.migrate().await?;
	Ok(store)
}

/// Build the SQLite-backed services described by `config`.
pub async fn build_services(config: &ServerConfig) -> Result<Services, ServerError> {
	let pool = create_pool(&pool_settings(&config.database)).await?;

	let identity = SqliteIdentityService::new(pool.clone());
	identity.migrate().await?;

	let (events, receiver) = channel();
	let store = SqliteDocumentStore::new(pool).with_events(events);
	store.migrate().await?;

	let identity: Arc<dyn IdentityService> = Arc::new(identity);
	let store: Arc<dyn DocumentStore> = Arc::new(store);

	let mailer = match &config.smtp {
		Some(smtp_config) => {
			let client = SmtpClient::new(smtp_client_config(smtp_config))?;
			if let Err(e) = client.check_health().await {
				warn!(host = %smtp_config.host, error = %e, "SMTP relay not reachable at startup; sends will fail until it is");
			}
			Some(Arc::new(client) as Arc<dyn Mailer>)
		}
		None => None,
	};

	let dispatcher = build_dispatcher(receiver, Arc::clone(&store), mailer, config)?;
	let state = create_app_state(identity, store, config)?;

	Ok(Services { state, dispatcher })
}

/// Create the trigger dispatcher and register the contact notifier.
///
/// Without a mailer the notifier is not registered and contact records stay
/// `pending`.
pub fn build_dispatcher(
	events: EventReceiver,
	store: Arc<dyn DocumentStore>,
	mailer: Option<Arc<dyn Mailer>>,
	config: &ServerConfig,
) -> Result<TriggerDispatcher, ServerError> {
	let mut dispatcher = TriggerDispatcher::new(events, store);

	match (mailer, &config.smtp, config.notify.recipient.as_deref()) {
		(Some(mailer), Some(smtp_config), Some(recipient)) => {
			let collection = CollectionPath::root(&config.notify.collection)?;
			let notifier = ContactNotifier::new(mailer, smtp_config.from_header(), recipient);
			dispatcher.register(collection, Arc::new(notifier));
			info!(recipient = %recipient, "contact notifications enabled");
		}
		_ => {
			warn!("SMTP or notify recipient not configured; contact notifications disabled");
		}
	}

	Ok(dispatcher)
}

/// Translate the server's SMTP section into mail client settings.
pub fn smtp_client_config(config: &SmtpConfig) -> smtp::SmtpConfig {
	smtp::SmtpConfig {
		host: config.host.clone(),
		port: config.port,
		username: config.username.clone(),
		password: config.password.clone(),
		tls_mode: match config.tls_mode {
			TlsMode::None => smtp::TlsMode::None,
			TlsMode::StartTls => smtp::TlsMode::StartTls,
			TlsMode::Tls => smtp::TlsMode::Tls,
		},
	}
}
