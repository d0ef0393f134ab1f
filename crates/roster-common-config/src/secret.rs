// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Secret wrapper that keeps sensitive values out of logs.
//!
//! [`Secret<T>`] redacts its contents in `Debug`, `Display` and `Serialize`
//! output and zeroizes the wrapped value when dropped. Reading the value
//! requires an explicit call to [`Secret::expose`].

use std::fmt;

use zeroize::Zeroize;

/// Placeholder written wherever a secret value would otherwise appear.
pub const REDACTED: &str = "[REDACTED]";

/// A value that must never be logged or serialized in plain text.
pub struct Secret<T: Zeroize> {
	inner: T,
}

/// The common case: a secret string (passwords, tokens).
pub type SecretString = Secret<String>;

impl<T: Zeroize> Secret<T> {
	/// Wrap a sensitive value.
	pub fn new(value: T) -> Self {
		Self { inner: value }
	}

	/// Borrow the wrapped value.
	///
	/// Call sites should be easy to audit; avoid passing the result to
	/// anything that formats it.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl<T: Zeroize + Default> Secret<T> {
	/// Take the wrapped value out, leaving a zeroized default behind.
	pub fn into_inner(mut self) -> T {
		std::mem::take(&mut self.inner)
	}
}

impl<T: Zeroize> Drop for Secret<T> {
	fn drop(&mut self) {
		self.inner.zeroize();
	}
}

impl<T: Zeroize + Clone> Clone for Secret<T> {
	fn clone(&self) -> Self {
		Self::new(self.inner.clone())
	}
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Secret({REDACTED})")
	}
}

impl<T: Zeroize> fmt::Display for Secret<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

#[cfg(feature = "serde")]
impl<T: Zeroize> serde::Serialize for Secret<T> {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(REDACTED)
	}
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for Secret<T>
where
	T: Zeroize + serde::Deserialize<'de>,
{
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		T::deserialize(deserializer).map(Self::new)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn debug_is_redacted() {
		let secret = SecretString::new("hunter2".to_string());
		let debug = format!("{secret:?}");
		assert!(!debug.contains("hunter2"));
		assert!(debug.contains(REDACTED));
	}

	#[test]
	fn display_is_redacted() {
		let secret = SecretString::from("hunter2");
		assert_eq!(secret.to_string(), REDACTED);
	}

	#[test]
	fn expose_returns_value() {
		let secret = SecretString::from("hunter2");
		assert_eq!(secret.expose(), "hunter2");
	}

	#[test]
	fn into_inner_returns_value() {
		let secret = SecretString::from("hunter2");
		assert_eq!(secret.into_inner(), "hunter2");
	}

	#[test]
	fn serialize_is_redacted() {
		let secret = SecretString::from("hunter2");
		let json = serde_json::to_string(&secret).unwrap();
		assert_eq!(json, format!("\"{REDACTED}\""));
	}

	#[test]
	fn deserialize_reads_plain_value() {
		let secret: SecretString = serde_json::from_str("\"hunter2\"").unwrap();
		assert_eq!(secret.expose(), "hunter2");
	}

	proptest! {
		#[test]
		fn value_never_in_debug_output(value in "[a-zA-Z0-9]{8,32}") {
			prop_assume!(!REDACTED.contains(&value));
			prop_assume!(!"Secret".contains(&value));
			let secret = SecretString::new(value.clone());
			let debug = format!("{secret:?}");
			prop_assert!(!debug.contains(&value));
		}
	}
}
