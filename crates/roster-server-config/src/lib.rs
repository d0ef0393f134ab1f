// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for Roster server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`ROSTER_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use roster_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use std::path::PathBuf;

use roster_server_smtp::is_valid_email;
use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub smtp: Option<SmtpConfig>,
	pub notify: NotifyConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`ROSTER_SERVER_*`)
/// 2. Config file (`/etc/roster/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize()?;
	let smtp = layer.smtp.and_then(|l| l.finalize());
	let notify = layer.notify.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(smtp.as_ref(), &notify)?;

	info!(
		host = %http.host,
		port = http.port,
		database = %database.url,
		smtp_configured = smtp.is_some(),
		notify_collection = %notify.collection,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		smtp,
		notify,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(smtp: Option<&SmtpConfig>, notify: &NotifyConfig) -> Result<(), ConfigError> {
	if let Some(smtp) = smtp {
		// The display name comes from from_name.
		if !is_valid_email(&smtp.from_address) || smtp.from_address.contains('<') {
			return Err(ConfigError::Validation(format!(
				"ROSTER_SERVER_SMTP_FROM_ADDRESS '{}' is not a valid email address",
				smtp.from_address
			)));
		}

		let Some(recipient) = notify.recipient.as_deref() else {
			return Err(ConfigError::Validation(
				"SMTP is configured but ROSTER_SERVER_NOTIFY_RECIPIENT is not set. \
				 Contact notifications need an operator address."
					.to_string(),
			));
		};
		if !is_valid_email(recipient) {
			return Err(ConfigError::Validation(format!(
				"ROSTER_SERVER_NOTIFY_RECIPIENT '{recipient}' is not a valid email address"
			)));
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn smtp() -> SmtpConfig {
		SmtpConfigLayer {
			host: Some("smtp.example.com".to_string()),
			from_address: Some("noreply@example.com".to_string()),
			..Default::default()
		}
		.finalize()
		.unwrap()
	}

	#[test]
	fn test_smtp_requires_recipient() {
		let result = validate_config(Some(&smtp()), &NotifyConfig::default());
		assert!(result.unwrap_err().to_string().contains("NOTIFY_RECIPIENT"));
	}

	#[test]
	fn test_recipient_must_be_address() {
		let notify = NotifyConfig {
			recipient: Some("not an address".to_string()),
			..Default::default()
		};
		assert!(validate_config(Some(&smtp()), &notify).is_err());
	}

	#[test]
	fn test_from_address_must_be_address() {
		let mut smtp = smtp();
		smtp.from_address = "noreply".to_string();
		let notify = NotifyConfig {
			recipient: Some("ops@example.com".to_string()),
			..Default::default()
		};
		let err = validate_config(Some(&smtp), &notify).unwrap_err();
		assert!(err.to_string().contains("SMTP_FROM_ADDRESS"));
	}

	#[test]
	fn test_no_smtp_needs_no_recipient() {
		assert!(validate_config(None, &NotifyConfig::default()).is_ok());
	}

	#[test]
	fn test_valid_smtp_and_recipient() {
		let notify = NotifyConfig {
			recipient: Some("ops@example.com".to_string()),
			..Default::default()
		};
		assert!(validate_config(Some(&smtp()), &notify).is_ok());
	}

	#[test]
	fn test_socket_addr() {
		let config = ServerConfig {
			http: HttpConfig {
				host: "127.0.0.1".to_string(),
				port: 9000,
			},
			..Default::default()
		};
		assert_eq!(config.socket_addr(), "127.0.0.1:9000");
	}

	#[test]
	fn test_env_overrides_file() {
		let _guard = sources::tests::ENV_MUTEX
			.lock()
			.unwrap_or_else(|e| e.into_inner());
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
			[http]
			host = "127.0.0.1"
			port = 7000

			[logging]
			format = "json"
			"#
		)
		.unwrap();
		std::env::set_var("ROSTER_SERVER_PORT", "7100");

		let config = load_config_with_file(file.path());
		std::env::remove_var("ROSTER_SERVER_PORT");
		let config = config.unwrap();

		assert_eq!(config.http.host, "127.0.0.1");
		assert_eq!(config.http.port, 7100);
		assert_eq!(config.logging.format, LogFormat::Json);
		assert_eq!(config.database.url, "sqlite:./roster.db");
		assert!(config.smtp.is_none());
	}
}
