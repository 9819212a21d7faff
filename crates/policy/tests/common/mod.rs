// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! An in-memory fake of the storage/db contract, used to
//! exercise compilation and enforcement without a real index layer.

use std::collections::{BTreeMap, HashMap, HashSet};

use reifydb_core::{
	BoxFuture, ClassId, ClassPropertyStats, Flake, IndexRangeOpts, PolicyStats, PolicyStorage, PropertyId,
	QueryBudget, ResultRows, StorageError, SubjectId,
};
use serde_json::Value;

const IRI_NAMESPACE: u32 = 1;

/// Canned query results, keyed by the `"marker"` field tests embed in
/// their query bodies — this fake never interprets the query language
/// itself, only routes by the marker.
#[derive(Default)]
pub struct FakeStorage {
	pub class_membership: HashMap<SubjectId, HashSet<ClassId>>,
	pub class_stats: HashMap<ClassId, ClassPropertyStats>,
	pub query_results: HashMap<String, Vec<BTreeMap<String, Value>>>,
	/// Mirrors a catalog that hasn't wired up class statistics at all —
	/// distinct from a catalog with stats registered for zero classes.
	/// Flips to `true` the first time [`Self::with_class`] is called.
	pub has_class_stats: bool,
}

impl FakeStorage {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn sid(iri: &str) -> SubjectId {
		SubjectId::new(IRI_NAMESPACE, iri)
	}

	pub fn with_class(mut self, class: &str, properties: &[&str]) -> Self {
		self.has_class_stats = true;
		self.class_stats.insert(
			Self::sid(class),
			ClassPropertyStats {
				properties: properties.iter().map(|p| Self::sid(p)).collect(),
			},
		);
		self
	}

	pub fn with_membership(mut self, subject: &str, classes: &[&str]) -> Self {
		self.class_membership.insert(Self::sid(subject), classes.iter().map(|c| Self::sid(c)).collect());
		self
	}

	pub fn with_query_result(mut self, marker: &str, rows: Vec<BTreeMap<String, Value>>) -> Self {
		self.query_results.insert(marker.to_string(), rows);
		self
	}
}

impl PolicyStats for FakeStorage {
	fn classes(&self) -> &HashMap<ClassId, ClassPropertyStats> {
		&self.class_stats
	}
}

impl PolicyStorage for FakeStorage {
	fn class_ids<'a>(
		&'a self,
		_budget: &'a QueryBudget,
		subject: &'a SubjectId,
	) -> BoxFuture<'a, Result<HashSet<ClassId>, StorageError>> {
		Box::pin(async move { Ok(self.class_membership.get(subject).cloned().unwrap_or_default()) })
	}

	fn query<'a>(
		&'a self,
		_budget: &'a QueryBudget,
		parsed_query: &'a Value,
	) -> BoxFuture<'a, Result<ResultRows, StorageError>> {
		Box::pin(async move {
			let marker = parsed_query.get("marker").and_then(Value::as_str);
			let rows = marker.and_then(|m| self.query_results.get(m)).cloned().unwrap_or_default();
			Ok(ResultRows(rows))
		})
	}

	fn iri_to_sid(&self, iri: &str) -> SubjectId {
		Self::sid(iri)
	}

	fn sid_to_iri(&self, sid: &SubjectId) -> Box<str> {
		sid.local_name().into()
	}

	fn index_range<'a>(
		&'a self,
		_index_name: &'a str,
		_predicate: &'a PropertyId,
		_args: &'a [SubjectId],
		_opts: IndexRangeOpts,
	) -> BoxFuture<'a, Result<Vec<Flake>, StorageError>> {
		Box::pin(async move { Ok(Vec::new()) })
	}

	fn stats(&self) -> Option<&dyn PolicyStats> {
		self.has_class_stats.then_some(self as &dyn PolicyStats)
	}

	fn root(&self) -> &dyn PolicyStorage {
		self
	}
}
