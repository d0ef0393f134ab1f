// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Outbound mail service for Roster.
//!
//! This crate provides the [`Mailer`] trait that handlers use to deliver
//! email, an async SMTP implementation backed by [`lettre`], and a
//! [`RecordingMailer`] that captures messages in memory.
//!
//! # Features
//!
//! - Async email sending using [`lettre`]
//! - TLS, STARTTLS or plain connections
//! - Optional authentication
//! - Multipart emails (HTML + plain text) with an optional `Reply-To`
//! - Secure password handling via [`SecretString`]
//!
//! # Example
//!
//! ```no_run
//! use roster_server_smtp::{Mailer, OutboundEmail, SmtpClient, SmtpConfig, TlsMode};
//! use roster_common_config::SecretString;
//!
//! # async fn example() -> Result<(), roster_server_smtp::SmtpError> {
//! let config = SmtpConfig {
//!     host: "smtp.example.com".to_string(),
//!     port: 587,
//!     username: Some("user@example.com".to_string()),
//!     password: Some(SecretString::new("password".to_string())),
//!     tls_mode: TlsMode::StartTls,
//! };
//!
//! let client = SmtpClient::new(config)?;
//! client
//!     .send(&OutboundEmail {
//!         from: "Roster <noreply@example.com>".to_string(),
//!         to: "ops@example.com".to_string(),
//!         reply_to: None,
//!         subject: "Hello".to_string(),
//!         html: "<h1>Hello World</h1>".to_string(),
//!         text: "Hello World".to_string(),
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod recording;

pub use recording::RecordingMailer;

use async_trait::async_trait;
use lettre::{
	message::{header::ContentType, Mailbox, MultiPart, SinglePart},
	transport::smtp::authentication::Credentials,
	AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use roster_common_config::SecretString;
use serde::{Deserialize, Serialize};

/// Errors that can occur during mail operations.
///
/// Each variant captures a specific failure mode with a descriptive message.
#[derive(Debug, thiserror::Error)]
pub enum SmtpError {
	/// Failed to connect to the SMTP server.
	#[error("connection failed: {0}")]
	Connection(String),

	/// Failed to build or send an email message.
	#[error("send failed: {0}")]
	Send(String),

	/// Invalid email address format.
	#[error("invalid email address: {0}")]
	Address(String),
}

/// TLS mode for SMTP connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
	/// No TLS (plain text connection). Only for local relays.
	None,
	/// STARTTLS upgrade after connecting.
	StartTls,
	/// Direct TLS connection.
	#[default]
	Tls,
}

/// Connection settings for the SMTP client.
///
/// The `password` field uses [`SecretString`] so it is never logged.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
	/// SMTP server hostname (e.g., "smtp.gmail.com").
	pub host: String,
	/// SMTP server port. Common values: 25, 465 (TLS), 587 (STARTTLS).
	pub port: u16,
	/// Optional username for SMTP authentication.
	pub username: Option<String>,
	/// Optional password for SMTP authentication.
	pub password: Option<SecretString>,
	/// How the connection is secured.
	pub tls_mode: TlsMode,
}

/// A fully composed message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
	/// Sender mailbox, e.g. `Roster <noreply@example.com>`.
	pub from: String,
	/// Recipient mailbox.
	pub to: String,
	/// Address replies should go to, if different from the sender.
	pub reply_to: Option<String>,
	pub subject: String,
	pub html: String,
	pub text: String,
}

/// The outbound mail service as seen by handlers.
#[async_trait]
pub trait Mailer: Send + Sync {
	/// Deliver one message.
	async fn send(&self, email: &OutboundEmail) -> Result<(), SmtpError>;
}

/// Async SMTP client for sending emails.
///
/// The client is created once at startup and reused for every message. It
/// maintains a connection pool internally via [`lettre`].
pub struct SmtpClient {
	transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpClient {
	/// Create a new SMTP client from the given configuration.
	///
	/// The actual connection is made lazily when sending emails.
	///
	/// # Errors
	///
	/// Returns [`SmtpError::Connection`] if the transport cannot be built.
	#[tracing::instrument(
        name = "smtp_client_new",
        skip(config),
        fields(host = %config.host, port = %config.port, tls_mode = ?config.tls_mode)
    )]
	pub fn new(config: SmtpConfig) -> Result<Self, SmtpError> {
		let builder = match config.tls_mode {
			TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
				.map_err(|e| SmtpError::Connection(format!("{e}")))?,
			TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
				.map_err(|e| SmtpError::Connection(format!("{e}")))?,
			TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
		};

		let mut builder = builder.port(config.port);

		if let (Some(username), Some(password)) = (config.username, config.password) {
			let credentials = Credentials::new(username, password.into_inner());
			builder = builder.credentials(credentials);
		}

		let transport = builder.build();

		tracing::debug!("SMTP client initialized");

		Ok(Self { transport })
	}

	/// Check if the SMTP server is reachable and responding.
	///
	/// # Errors
	///
	/// Returns [`SmtpError::Connection`] if the server is unreachable.
	#[tracing::instrument(name = "smtp_check_health", skip(self))]
	pub async fn check_health(&self) -> Result<(), SmtpError> {
		tracing::debug!("checking SMTP server health");
		self
			.transport
			.test_connection()
			.await
			.map_err(|e| SmtpError::Connection(format!("{e}")))?;
		tracing::debug!("SMTP server is healthy");
		Ok(())
	}
}

#[async_trait]
impl Mailer for SmtpClient {
	/// Sends a multipart email with both HTML and plain text versions.
	#[tracing::instrument(name = "smtp_send", skip(self, email), fields(subject = %email.subject))]
	async fn send(&self, email: &OutboundEmail) -> Result<(), SmtpError> {
		let message = build_message(email)?;

		tracing::debug!("sending email");

		self
			.transport
			.send(message)
			.await
			.map_err(|e| SmtpError::Send(format!("{e}")))?;

		tracing::info!("email sent successfully");

		Ok(())
	}
}

fn parse_mailbox(address: &str) -> Result<Mailbox, SmtpError> {
	address
		.parse()
		.map_err(|e| SmtpError::Address(format!("{address}: {e}")))
}

/// Build the lettre message for an [`OutboundEmail`].
fn build_message(email: &OutboundEmail) -> Result<Message, SmtpError> {
	let mut builder = Message::builder()
		.from(parse_mailbox(&email.from)?)
		.to(parse_mailbox(&email.to)?)
		.subject(email.subject.clone());

	if let Some(reply_to) = &email.reply_to {
		builder = builder.reply_to(parse_mailbox(reply_to)?);
	}

	builder
		.multipart(
			MultiPart::alternative()
				.singlepart(
					SinglePart::builder()
						.header(ContentType::TEXT_PLAIN)
						.body(email.text.clone()),
				)
				.singlepart(
					SinglePart::builder()
						.header(ContentType::TEXT_HTML)
						.body(email.html.clone()),
				),
		)
		.map_err(|e| SmtpError::Send(format!("failed to build message: {e}")))
}

/// Validate an email address format.
///
/// Uses [`lettre`]'s [`Mailbox`] parser. This validates the format, not
/// whether the address actually exists.
///
/// ```
/// use roster_server_smtp::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(is_valid_email("User Name <user@example.com>"));
/// assert!(!is_valid_email("not-an-email"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
	email.parse::<Mailbox>().is_ok()
}
