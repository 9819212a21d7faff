// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Shapes JSON-LD query maps for the policy engine's two embedded-query
//! use sites: target subqueries and policy-embedded
//! queries.
//!
//! This crate does not parse or execute the query language itself — the
//! SPARQL/FQL parser and executor live behind `PolicyStorage::query`
//! and are out of scope here. `ParsedQuery` only
//! normalizes the map shape every caller needs: `select`, `limit`, and
//! an injected `values` block.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};
use thiserror::Error;

/// The preferred bound-variable name for the candidate subject.
pub const THIS_VAR: &str = "?$this";

/// The legacy alias for [`THIS_VAR`], accepted only in target subqueries.
pub const LEGACY_TARGET_VAR: &str = "?$target";

/// The caller-identity variable, always bound to a ground value before
/// any query executes.
pub const IDENTITY_VAR: &str = "?$identity";

#[derive(Debug, Error)]
pub enum QueryError {
	#[error("policy query body must be a JSON object, got: {0}")]
	NotAnObject(Value),
}

/// A policy-embedded or target query, normalized to a JSON-LD query map.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedQuery(Map<String, Value>);

impl ParsedQuery {
	/// Parses a raw query body without coercing `select`/`limit`.
	pub fn parse(raw: Value) -> Result<Self, QueryError> {
		match raw {
			Value::Object(map) => Ok(Self(map)),
			other => Err(QueryError::NotAnObject(other)),
		}
	}

	/// Parses a raw query body and coerces it to `select ?$this limit
	/// 1`, unless the query already declares its own `select`. Used for
	/// both target subqueries (`onSubject`/`onProperty` query entries)
	/// and a policy's own embedded `f:query` decision body.
	pub fn parse_target(raw: Value) -> Result<Self, QueryError> {
		let mut query = Self::parse(raw)?;
		query.0.entry("select").or_insert_with(|| json!([THIS_VAR]));
		query.0.entry("limit").or_insert_with(|| json!(1));
		Ok(query)
	}

	/// The variable this query is expected to bind: `?$this` if
	/// present in `select`, else the legacy `?$target` alias, else
	/// `None` if neither appears.
	pub fn bound_variable(&self) -> Option<&'static str> {
		let select = self.0.get("select")?.as_array()?;
		let names: Vec<&str> = select.iter().filter_map(Value::as_str).collect();
		if names.contains(&THIS_VAR) {
			Some(THIS_VAR)
		} else if names.contains(&LEGACY_TARGET_VAR) {
			Some(LEGACY_TARGET_VAR)
		} else {
			None
		}
	}

	/// Injects a `values` block binding `variables` to `rows`, merging
	/// with any pre-existing `values` block (policy-supplied bindings
	/// come first, injected bindings are appended).
	pub fn with_values(mut self, variables: &[String], rows: &[BTreeMap<String, Value>]) -> Self {
		if rows.is_empty() {
			return self;
		}
		let injected = json!({
			"variables": variables,
			"rows": rows,
		});
		self.0.insert("values".to_string(), injected);
		self
	}

	pub fn as_value(&self) -> Value {
		Value::Object(self.0.clone())
	}
}
