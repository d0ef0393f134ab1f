// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration merged across sources.

use serde::Deserialize;

use crate::sections::{
	DatabaseConfigLayer, HttpConfigLayer, LoggingConfigLayer, NotifyConfigLayer, SmtpConfigLayer,
};

/// One source's view of the configuration. Unset sections are `None`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfigLayer {
	pub http: Option<HttpConfigLayer>,
	pub database: Option<DatabaseConfigLayer>,
	pub smtp: Option<SmtpConfigLayer>,
	pub notify: Option<NotifyConfigLayer>,
	pub logging: Option<LoggingConfigLayer>,
}

macro_rules! merge_section {
	($self:ident, $other:ident, $field:ident) => {
		if let Some(overlay) = $other.$field {
			match $self.$field.as_mut() {
				Some(base) => base.merge(overlay),
				None => $self.$field = Some(overlay),
			}
		}
	};
}

impl ServerConfigLayer {
	/// Overlay `other` on top of `self`; set fields in `other` win.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_section!(self, other, http);
		merge_section!(self, other, database);
		merge_section!(self, other, smtp);
		merge_section!(self, other, notify);
		merge_section!(self, other, logging);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_keeps_base_fields_not_in_overlay() {
		let mut base: ServerConfigLayer = toml::from_str(
			r#"
			[http]
			host = "127.0.0.1"
			port = 9000
			"#,
		)
		.unwrap();
		let overlay: ServerConfigLayer = toml::from_str(
			r#"
			[http]
			port = 9100
			"#,
		)
		.unwrap();

		base.merge(overlay);
		let http = base.http.unwrap();
		assert_eq!(http.host.as_deref(), Some("127.0.0.1"));
		assert_eq!(http.port, Some(9100));
	}

	#[test]
	fn test_merge_fills_missing_section() {
		let mut base = ServerConfigLayer::default();
		base.merge(ServerConfigLayer {
			database: Some(DatabaseConfigLayer {
				url: Some("sqlite::memory:".to_string()),
				..Default::default()
			}),
			..Default::default()
		});
		assert_eq!(
			base.database.and_then(|d| d.url).as_deref(),
			Some("sqlite::memory:")
		);
	}

	#[test]
	fn test_full_toml_parses() {
		let layer: ServerConfigLayer = toml::from_str(
			r#"
			[http]
			host = "0.0.0.0"
			port = 8080

			[database]
			url = "sqlite:/var/lib/roster/roster.db"
			max_connections = 10

			[smtp]
			host = "smtp.example.com"
			port = 465
			username = "mailer"
			password = "hunter2"
			from_address = "noreply@example.com"
			tls_mode = "tls"

			[notify]
			recipient = "ops@example.com"

			[logging]
			level = "debug"
			format = "json"
			"#,
		)
		.unwrap();

		assert_eq!(layer.database.unwrap().max_connections, Some(10));
		let smtp = layer.smtp.unwrap();
		assert_eq!(smtp.port, Some(465));
		assert_eq!(smtp.password.unwrap().expose(), "hunter2");
		assert_eq!(
			layer.notify.unwrap().recipient.as_deref(),
			Some("ops@example.com")
		);
	}
}
