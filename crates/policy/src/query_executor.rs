// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Executes a policy's embedded `Query(q)` decision.

use std::collections::BTreeMap;

use reifydb_core::{PolicyStorage, QueryBudget};
use reifydb_rql::{ParsedQuery, THIS_VAR};
use serde_json::json;
use tracing::instrument;

use crate::error::Result;
use crate::values::PolicyValues;

/// Clones `policy_values`, binds `?$this` to `subject_iri` in every row,
/// and runs the query against the root (policy-unwrapped) view. A
/// non-empty result allows.
#[instrument(name = "policy::query_executor::execute", level = "trace", skip(storage, budget, policy_values, query))]
pub async fn execute(
	storage: &dyn PolicyStorage,
	budget: &QueryBudget,
	policy_values: &PolicyValues,
	query: &ParsedQuery,
	subject_iri: &str,
) -> Result<bool> {
	if budget.is_expired() {
		tracing::warn!(subject = subject_iri, "policy query timed out; treating as deny");
		return Ok(false);
	}

	let mut variables = policy_values.variables.clone();
	if !variables.iter().any(|v| v == THIS_VAR) {
		variables.push(THIS_VAR.to_string());
	}

	let this_binding = json!({"value": subject_iri, "type": "@id"});
	let mut rows = if policy_values.rows.is_empty() {
		vec![BTreeMap::new()]
	} else {
		policy_values.rows.clone()
	};
	for row in &mut rows {
		row.insert(THIS_VAR.to_string(), this_binding.clone());
	}

	let bound = query.clone().with_values(&variables, &rows);
	let rows = storage.root().query(budget, &bound.as_value()).await?;
	Ok(!rows.is_empty())
}
