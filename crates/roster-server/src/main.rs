// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Roster server binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roster_server::{
	build_services, create_router, list_contacts, open_identity, open_store, ServerConfig,
};
use roster_server_config::LogFormat;
use roster_server_identity::{IdentityService, NewAccount};
use roster_server_store::CollectionPath;
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod version;

/// Roster server - company user provisioning and contact notifications.
#[derive(Parser, Debug)]
#[command(name = "roster-server", about = "Roster server", version)]
struct Args {
	/// Path to a TOML config file (defaults to /etc/roster/server.toml)
	#[arg(long, env = "ROSTER_SERVER_CONFIG", global = true)]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Run the HTTP server (default)
	Serve,
	/// Show version and build information
	Version,
	/// Create an account in the identity service
	CreateUser {
		#[arg(long)]
		email: String,
		#[arg(long, env = "ROSTER_CREATE_USER_PASSWORD", hide_env_values = true)]
		password: String,
	},
	/// Issue a bearer token for an existing account and print it
	IssueToken {
		#[arg(long)]
		email: String,
	},
	/// List contact messages with their notification status
	Contacts {
		/// Only show messages with this status (pending, sent, failed)
		#[arg(long)]
		status: Option<String>,
	},
}

fn init_tracing(config: &ServerConfig) {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());

	let (pretty, json) = match config.logging.format {
		LogFormat::Pretty => (Some(tracing_subscriber::fmt::layer()), None),
		LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
	};

	tracing_subscriber::registry()
		.with(filter)
		.with(pretty)
		.with(json)
		.init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => roster_server_config::load_config_with_file(path)?,
		None => roster_server_config::load_config()?,
	};

	init_tracing(&config);

	match args.command {
		Some(Command::CreateUser { email, password }) => {
			let identity = open_identity(&config).await?;
			let account = identity
				.create_user(NewAccount::new(email, password))
				.await?;
			println!("{}", account.id);
			Ok(())
		}
		Some(Command::IssueToken { email }) => {
			let identity = open_identity(&config).await?;
			let account = identity
				.get_user_by_email(&email)
				.await?
				.ok_or_else(|| format!("no account for {email}"))?;
			let token = identity.issue_token(&account.id).await?;
			println!("{}", token.expose());
			Ok(())
		}
		Some(Command::Contacts { status }) => {
			let store = open_store(&config).await?;
			let collection = CollectionPath::root(&config.notify.collection)?;
			for contact in list_contacts(&store, &collection, status.as_deref()).await? {
				println!("{contact}");
			}
			Ok(())
		}
		Some(Command::Version) => Ok(()),
		Some(Command::Serve) | None => serve(config).await,
	}
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		"starting roster-server"
	);

	let services = build_services(&config).await?;
	let dispatcher = services.dispatcher.spawn();

	let app = create_router(services.state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Waiting for in-flight triggers...");
	dispatcher.shutdown().await;

	tracing::info!("Server shutdown complete");
	Ok(())
}
