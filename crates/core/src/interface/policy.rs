// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! The storage/db contract the policy engine consumes.
//!
//! This crate never implements storage, indexing, commit/merge, or the
//! SPARQL/FQL query language itself — those are external collaborators.
//! `PolicyStorage` is the seam: a production build wires it to the real
//! engine, a test build wires it to an in-memory fake.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use crate::id::{ClassId, PropertyId, SubjectId};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Opaque storage-layer failure. Propagated unchanged.
#[derive(Clone, Debug, thiserror::Error)]
#[error("storage error: {0}")]
pub struct StorageError(pub String);

impl StorageError {
	pub fn new(message: impl Into<String>) -> Self {
		Self(message.into())
	}
}

/// Per-call budget threaded through storage/query invocations so the
/// policy-query executor can honour the enclosing query's fuel/timeout
/// budget.
#[derive(Clone, Debug, Default)]
pub struct QueryBudget {
	pub deadline: Option<Instant>,
}

impl QueryBudget {
	pub fn unbounded() -> Self {
		Self {
			deadline: None,
		}
	}

	pub fn is_expired(&self) -> bool {
		self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
	}
}

/// A single row of a query result: variable name -> bound value.
pub type ResultRow = BTreeMap<String, serde_json::Value>;

/// Rows produced by executing a parsed query.
#[derive(Clone, Debug, Default)]
pub struct ResultRows(pub Vec<ResultRow>);

impl ResultRows {
	pub fn empty() -> Self {
		Self(Vec::new())
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns the bound value of `var` in the first row, if any.
	pub fn first_binding(&self, var: &str) -> Option<&serde_json::Value> {
		self.0.first().and_then(|row| row.get(var))
	}
}

/// Per-class property statistics used to expand `onClass` targeting.
#[derive(Clone, Debug, Default)]
pub struct ClassPropertyStats {
	pub properties: BTreeSet<PropertyId>,
}

/// The subset of catalog statistics the policy compiler needs. Only
/// required when a policy document uses `onClass`.
pub trait PolicyStats: Send + Sync {
	fn classes(&self) -> &HashMap<ClassId, ClassPropertyStats>;
}

/// A single row returned by `index_range`, used by refresh to locate
/// the flakes carrying the raw subject/property specs of a policy.
pub type IndexFlake = crate::flake::Flake;

/// Options narrowing an `index_range` scan.
#[derive(Clone, Debug, Default)]
pub struct IndexRangeOpts {
	pub limit: Option<usize>,
}

/// The storage/db contract consumed by the policy engine.
pub trait PolicyStorage: Send + Sync {
	/// `class_ids(db, tracker, sid) -> future<Set<SID>>`
	fn class_ids<'a>(
		&'a self,
		budget: &'a QueryBudget,
		subject: &'a SubjectId,
	) -> BoxFuture<'a, Result<std::collections::HashSet<ClassId>, StorageError>>;

	/// `query(root_db, tracker, parsed_query) -> future<ResultRows>`
	fn query<'a>(
		&'a self,
		budget: &'a QueryBudget,
		parsed_query: &'a serde_json::Value,
	) -> BoxFuture<'a, Result<ResultRows, StorageError>>;

	/// `iri_to_sid(db, iri) -> SID`
	fn iri_to_sid(&self, iri: &str) -> SubjectId;

	/// `sid_to_iri(db, sid) -> Iri`
	fn sid_to_iri(&self, sid: &SubjectId) -> Box<str>;

	/// `index_range(db, index_name, predicate, args, opts) -> future<Vec<Flake>>`
	fn index_range<'a>(
		&'a self,
		index_name: &'a str,
		predicate: &'a PropertyId,
		args: &'a [SubjectId],
		opts: IndexRangeOpts,
	) -> BoxFuture<'a, Result<Vec<IndexFlake>, StorageError>>;

	/// `stats(db).classes` — only required when any policy uses `onClass`.
	fn stats(&self) -> Option<&dyn PolicyStats>;

	/// A policy-unwrapped view of the same database, used to evaluate
	/// policy-embedded queries without recursion.
	fn root(&self) -> &dyn PolicyStorage;
}
