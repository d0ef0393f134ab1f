// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Contact notification email bodies.

use roster_server_store::DocumentSnapshot;

use crate::error::{NotifyError, Result};

/// Fields of a submitted contact form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
	pub name: String,
	pub email: String,
	pub company: String,
	pub message: String,
}

impl ContactMessage {
	/// Read the required fields from a contact record.
	pub fn from_snapshot(snapshot: &DocumentSnapshot) -> Result<Self> {
		let field = |name: &'static str| {
			snapshot
				.get_str(name)
				.map(str::to_string)
				.ok_or(NotifyError::MissingField(name))
		};
		Ok(Self {
			name: field("name")?,
			email: field("email")?,
			company: field("company")?,
			message: field("message")?,
		})
	}

	pub fn subject(&self) -> String {
		format!("New contact form submission from {}", self.name)
	}

	pub fn text_body(&self) -> String {
		format!(
			"New contact form submission\n\n\
			 Name: {}\n\
			 Email: {}\n\
			 Company: {}\n\n\
			 Message:\n{}\n",
			self.name, self.email, self.company, self.message
		)
	}

	pub fn html_body(&self) -> String {
		format!(
			"<h2>New contact form submission</h2>\n\
			 <p><strong>Name:</strong> {}</p>\n\
			 <p><strong>Email:</strong> {}</p>\n\
			 <p><strong>Company:</strong> {}</p>\n\
			 <p><strong>Message:</strong></p>\n\
			 <p>{}</p>\n",
			escape_html(&self.name),
			escape_html(&self.email),
			escape_html(&self.company),
			escape_html(&self.message).replace('\n', "<br>"),
		)
	}
}

fn escape_html(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	for c in input.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			_ => out.push(c),
		}
	}
	out
}
