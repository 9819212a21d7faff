// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::collections::BTreeMap;

use reifydb_rql::IDENTITY_VAR;
use serde_json::{Value, json};
use uuid::Uuid;

/// Pre-bound query variables supplied by the caller — notably
/// `?$identity` — embedded in every policy query executed for this
/// session.
#[derive(Clone, Debug, Default)]
pub struct PolicyValues {
	pub variables: Vec<String>,
	pub rows: Vec<BTreeMap<String, Value>>,
}

impl PolicyValues {
	pub fn new(variables: Vec<String>, rows: Vec<BTreeMap<String, Value>>) -> Self {
		Self {
			variables,
			rows,
		}
	}

	pub fn empty() -> Self {
		Self::default()
	}

	fn has_ground_identity(&self) -> bool {
		self.variables.iter().any(|v| v == IDENTITY_VAR)
			&& self.rows.iter().any(|row| {
				row.get(IDENTITY_VAR).map(|bound| !bound.is_null()).unwrap_or(false)
			})
	}

	/// Ensures `?$identity` is bound to a value that cannot occur in
	/// the database: if the caller already supplied one it is left
	/// untouched, otherwise a fresh, unmatchable value is generated.
	///
	/// Policies MUST NOT treat an unbound `?$identity` as a wildcard —
	/// this is what prevents that: after this call the variable is
	/// always bound in every row.
	pub fn ensure_ground_identity(mut self) -> Self {
		if self.has_ground_identity() {
			return self;
		}

		let fresh = format!("urn:reifydb:ephemeral-identity:{}", Uuid::new_v4());
		let binding = json!({"value": fresh, "type": "@id"});

		if !self.variables.iter().any(|v| v == IDENTITY_VAR) {
			self.variables.push(IDENTITY_VAR.to_string());
		}
		if self.rows.is_empty() {
			self.rows.push(BTreeMap::new());
		}
		for row in &mut self.rows {
			row.insert(IDENTITY_VAR.to_string(), binding.clone());
		}
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unbound_identity_becomes_ground_and_unique() {
		let a = PolicyValues::empty().ensure_ground_identity();
		let b = PolicyValues::empty().ensure_ground_identity();
		assert!(a.has_ground_identity());
		assert_ne!(a.rows[0][IDENTITY_VAR], b.rows[0][IDENTITY_VAR]);
	}

	#[test]
	fn caller_supplied_identity_is_preserved() {
		let mut row = BTreeMap::new();
		row.insert(IDENTITY_VAR.to_string(), json!({"value": "ex:alice", "type": "@id"}));
		let values = PolicyValues::new(vec![IDENTITY_VAR.to_string()], vec![row]).ensure_ground_identity();
		assert_eq!(values.rows[0][IDENTITY_VAR]["value"], "ex:alice");
	}
}
