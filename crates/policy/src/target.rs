// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Resolves a target expression — a literal IRI or an embedded subquery
//! — to a set of subject ids. Used both at compile
//! time and again on each transaction via refresh.

use std::collections::BTreeSet;

use reifydb_core::{PolicyStorage, QueryBudget, SubjectId};
use reifydb_rql::ParsedQuery;
use reifydb_type::Fragment;
use serde_json::Value;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::values::PolicyValues;

/// A policy's target, before resolution: a static IRI or a query whose
/// bound variable resolves to the set of matching subjects.
#[derive(Clone, Debug)]
pub enum TargetExpr {
	Iri(String),
	Query(ParsedQuery),
}

impl TargetExpr {
	/// Parses one entry of an `onSubject`/`onProperty`-style target
	/// list: a plain string is a literal IRI, an object is a subquery
	/// coerced to `select ?$this limit 1`.
	pub fn parse(raw: &Value) -> Result<Self> {
		match raw {
			Value::String(iri) => Ok(Self::Iri(iri.clone())),
			Value::Object(_) => ParsedQuery::parse_target(raw.clone())
				.map(Self::Query)
				.map_err(|err| Error::invalid_policy(err.to_string(), Fragment::None)),
			other => Err(Error::invalid_policy(
				format!("target entry must be an IRI string or a query object, got: {other}"),
				Fragment::None,
			)),
		}
	}
}

/// Resolves a sequence of target expressions against `storage`.
pub struct TargetResolver;

impl TargetResolver {
	#[instrument(name = "policy::target::resolve", level = "debug", skip(storage, budget, values, targets))]
	pub async fn resolve(
		storage: &dyn PolicyStorage,
		budget: &QueryBudget,
		values: &PolicyValues,
		concurrency: usize,
		targets: &[TargetExpr],
	) -> Result<BTreeSet<SubjectId>> {
		let mut resolved = BTreeSet::new();
		let mut query_tasks = Vec::new();

		for target in targets {
			match target {
				TargetExpr::Iri(iri) => {
					resolved.insert(storage.iri_to_sid(iri));
				}
				TargetExpr::Query(query) => {
					let query = query.clone().with_values(&values.variables, &values.rows);
					query_tasks.push(run_target_query(storage, budget, query));
				}
			}
		}

		let outcomes: Vec<BTreeSet<SubjectId>> = reifydb_runtime::join_bounded(query_tasks, concurrency).await?;
		for outcome in outcomes {
			resolved.extend(outcome);
		}
		Ok(resolved)
	}
}

async fn run_target_query(
	storage: &dyn PolicyStorage,
	budget: &QueryBudget,
	query: ParsedQuery,
) -> Result<BTreeSet<SubjectId>> {
	let var = query.bound_variable().ok_or_else(|| {
		Error::invalid_policy("target query must select ?$this (or the legacy ?$target)", Fragment::None)
	})?;

	let rows = storage.query(budget, &query.as_value()).await?;
	let mut sids = BTreeSet::new();
	for row in &rows.0 {
		if let Some(iri) = row.get(var).and_then(extract_iri) {
			sids.insert(storage.iri_to_sid(iri));
		}
	}
	Ok(sids)
}

fn extract_iri(value: &Value) -> Option<&str> {
	match value {
		Value::String(s) => Some(s.as_str()),
		Value::Object(map) => map.get("value").and_then(Value::as_str),
		_ => None,
	}
}
