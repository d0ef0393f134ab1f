// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Collection and document paths.
//!
//! Paths alternate collection and document ids, separated by `/`:
//!
//! ```text
//! companies/acme/users/4f1c...      document (even number of segments)
//! companies/acme/users              collection (odd number of segments)
//! ```
//!
//! Every segment is validated when the path is built, so a caller-supplied
//! id such as `acme/users` can never address a different record.

use std::fmt;

use crate::error::{Result, StoreError};

/// Longest id accepted for a single segment, in bytes.
pub const MAX_SEGMENT_BYTES: usize = 1500;

fn check_segment(id: &str) -> Result<()> {
	if id.is_empty() {
		return Err(StoreError::InvalidPath("empty path segment".to_string()));
	}
	if id.contains('/') {
		return Err(StoreError::InvalidPath(format!(
			"segment '{id}' must not contain '/'"
		)));
	}
	if id == "." || id == ".." {
		return Err(StoreError::InvalidPath(format!("segment '{id}' is reserved")));
	}
	if id.len() > MAX_SEGMENT_BYTES {
		return Err(StoreError::InvalidPath(format!(
			"segment exceeds {MAX_SEGMENT_BYTES} bytes"
		)));
	}
	Ok(())
}

/// Path to a collection of documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath {
	segments: Vec<String>,
}

impl CollectionPath {
	/// A top-level collection, e.g. `companies`.
	pub fn root(id: &str) -> Result<Self> {
		check_segment(id)?;
		Ok(Self {
			segments: vec![id.to_string()],
		})
	}

	/// Parse `a/b/c` style collection paths.
	pub fn parse(path: &str) -> Result<Self> {
		let segments = split(path)?;
		if segments.len() % 2 == 0 {
			return Err(StoreError::InvalidPath(format!(
				"'{path}' names a document, not a collection"
			)));
		}
		Ok(Self { segments })
	}

	/// The document `id` inside this collection.
	pub fn doc(&self, id: &str) -> Result<DocumentPath> {
		check_segment(id)?;
		let mut segments = self.segments.clone();
		segments.push(id.to_string());
		Ok(DocumentPath { segments })
	}

	/// Last segment.
	pub fn id(&self) -> &str {
		self.segments.last().map(String::as_str).unwrap_or_default()
	}
}

impl fmt::Display for CollectionPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.segments.join("/"))
	}
}

/// Path to a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
	segments: Vec<String>,
}

impl DocumentPath {
	/// Parse `a/b` style document paths.
	pub fn parse(path: &str) -> Result<Self> {
		let segments = split(path)?;
		if segments.len() % 2 != 0 {
			return Err(StoreError::InvalidPath(format!(
				"'{path}' names a collection, not a document"
			)));
		}
		Ok(Self { segments })
	}

	/// A subcollection under this document.
	pub fn collection(&self, id: &str) -> Result<CollectionPath> {
		check_segment(id)?;
		let mut segments = self.segments.clone();
		segments.push(id.to_string());
		Ok(CollectionPath { segments })
	}

	/// The collection that holds this document.
	pub fn parent(&self) -> CollectionPath {
		let mut segments = self.segments.clone();
		segments.pop();
		CollectionPath { segments }
	}

	/// Document id (last segment).
	pub fn id(&self) -> &str {
		self.segments.last().map(String::as_str).unwrap_or_default()
	}
}

impl fmt::Display for DocumentPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.segments.join("/"))
	}
}

fn split(path: &str) -> Result<Vec<String>> {
	let segments: Vec<String> = path.split('/').map(str::to_string).collect();
	for segment in &segments {
		check_segment(segment)?;
	}
	Ok(segments)
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn builds_nested_document_path() {
		let path = CollectionPath::root("companies")
			.unwrap()
			.doc("acme")
			.unwrap()
			.collection("users")
			.unwrap()
			.doc("u1")
			.unwrap();
		assert_eq!(path.to_string(), "companies/acme/users/u1");
		assert_eq!(path.id(), "u1");
		assert_eq!(path.parent().to_string(), "companies/acme/users");
		assert_eq!(path.parent().id(), "users");
	}

	#[test]
	fn rejects_slash_in_id() {
		let err = CollectionPath::root("companies")
			.unwrap()
			.doc("acme/users")
			.unwrap_err();
		assert!(matches!(err, StoreError::InvalidPath(_)));
	}

	#[test]
	fn rejects_empty_and_reserved_ids() {
		let companies = CollectionPath::root("companies").unwrap();
		assert!(companies.doc("").is_err());
		assert!(companies.doc(".").is_err());
		assert!(companies.doc("..").is_err());
		assert!(companies.doc(&"x".repeat(MAX_SEGMENT_BYTES + 1)).is_err());
	}

	#[test]
	fn parse_checks_parity() {
		assert!(DocumentPath::parse("userCompany/u1").is_ok());
		assert!(DocumentPath::parse("userCompany").is_err());
		assert!(CollectionPath::parse("companies/acme/users").is_ok());
		assert!(CollectionPath::parse("companies/acme").is_err());
		assert!(DocumentPath::parse("a//b").is_err());
	}

	proptest! {
		#[test]
		fn display_parse_round_trip(
			collection in "[a-zA-Z][a-zA-Z0-9_-]{0,20}",
			id in "[a-zA-Z0-9_-]{1,30}",
		) {
			let path = CollectionPath::root(&collection).unwrap().doc(&id).unwrap();
			let parsed = DocumentPath::parse(&path.to_string()).unwrap();
			prop_assert_eq!(parsed, path);
		}
	}
}
