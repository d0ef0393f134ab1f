// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Environment helpers for loading secrets.

use std::path::PathBuf;

use crate::SecretString;

/// Errors raised while loading a secret from the environment.
#[derive(Debug, thiserror::Error)]
pub enum SecretEnvError {
	/// Both `NAME` and `NAME_FILE` were set.
	#[error("both {name} and {name}_FILE are set; use only one")]
	Conflict { name: String },

	/// `NAME_FILE` pointed at a file that could not be read.
	#[error("failed to read {name}_FILE at {path}: {source}")]
	FileRead {
		name: String,
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Load a secret from `name`, or from the file named by `name_FILE`.
///
/// Returns `Ok(None)` when neither variable is set or the value is empty.
/// File contents are trimmed of surrounding whitespace so that secrets
/// mounted by orchestrators (which usually end in a newline) work as-is.
pub fn load_secret_env(name: &str) -> Result<Option<SecretString>, SecretEnvError> {
	let file_var = format!("{name}_FILE");
	let direct = std::env::var(name).ok().filter(|v| !v.is_empty());
	let file = std::env::var(&file_var).ok().filter(|v| !v.is_empty());

	match (direct, file) {
		(Some(_), Some(_)) => Err(SecretEnvError::Conflict {
			name: name.to_string(),
		}),
		(Some(value), None) => Ok(Some(SecretString::new(value))),
		(None, Some(path)) => {
			let path = PathBuf::from(path);
			let content =
				std::fs::read_to_string(&path).map_err(|source| SecretEnvError::FileRead {
					name: name.to_string(),
					path: path.clone(),
					source,
				})?;
			let trimmed = content.trim();
			if trimmed.is_empty() {
				tracing::warn!(var = %file_var, "secret file is empty");
				return Ok(None);
			}
			Ok(Some(SecretString::new(trimmed.to_string())))
		}
		(None, None) => Ok(None),
	}
}
