// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::cmp::Ordering;
use std::fmt;

/// An opaque, total-orderable identifier for a subject IRI: a
/// `(namespace_code, local_name)` pair, the database's compact
/// encoding of an IRI.
///
/// Property ids and class ids are themselves subjects (every property
/// and every class is itself addressable by IRI), so `PropertyId` and
/// `ClassId` below are aliases rather than distinct wrapper types.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct SubjectId {
	namespace_code: u32,
	local_name: Box<str>,
}

impl SubjectId {
	pub fn new(namespace_code: u32, local_name: impl Into<Box<str>>) -> Self {
		Self {
			namespace_code,
			local_name: local_name.into(),
		}
	}

	pub fn namespace_code(&self) -> u32 {
		self.namespace_code
	}

	pub fn local_name(&self) -> &str {
		&self.local_name
	}
}

impl fmt::Debug for SubjectId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Sid({}:{})", self.namespace_code, self.local_name)
	}
}

impl PartialOrd for SubjectId {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for SubjectId {
	fn cmp(&self, other: &Self) -> Ordering {
		(self.namespace_code, &self.local_name).cmp(&(other.namespace_code, &other.local_name))
	}
}

/// A property (predicate) id; always a [`SubjectId`].
pub type PropertyId = SubjectId;

/// A class id; always a [`SubjectId`].
pub type ClassId = SubjectId;

/// Well-known namespace code reserved for JSON-LD keyword properties
/// (`@id`, `@type`) that every subject carries implicitly.
pub const KEYWORD_NAMESPACE: u32 = 0;

/// The well-known property id for `@id`.
pub fn id_property() -> PropertyId {
	SubjectId::new(KEYWORD_NAMESPACE, "@id")
}

/// The well-known property id for `@type`.
pub fn type_property() -> PropertyId {
	SubjectId::new(KEYWORD_NAMESPACE, "@type")
}
