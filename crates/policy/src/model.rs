// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! The compiled, immutable data model: `CompiledPolicy`,
//! the indexed `PolicyWrapper`, and the per-request `MembershipCache`.

use std::collections::{BTreeSet, HashMap, HashSet};

use reifydb_core::{ClassId, PolicyStorage, PropertyId, QueryBudget, StorageError, SubjectId};
use reifydb_rql::ParsedQuery;
use tokio::sync::Mutex as AsyncMutex;

use crate::target::TargetExpr;
use crate::tracker::ExecutionTracker;
use crate::values::PolicyValues;

/// A policy's effective decision method. Exactly one applies per policy.
#[derive(Clone, Debug)]
pub enum PolicyKind {
	Allow(bool),
	Query(ParsedQuery),
	DefaultDeny,
}

/// A single compiled policy entry. Immutable once produced by
/// [`crate::compiler::wrap_policy`].
#[derive(Clone, Debug)]
pub struct CompiledPolicy {
	pub id: String,
	pub kind: PolicyKind,
	pub required: bool,
	pub ex_message: Option<String>,
	pub view: bool,
	pub modify: bool,

	/// True iff this entry was generated by expanding an `onClass`
	/// rule against a specific property.
	pub class_policy: bool,
	/// True iff runtime must verify the candidate subject is an
	/// instance of one of `for_classes`.
	pub class_check_needed: bool,
	/// The class ids this entry was fanned out for; non-empty iff
	/// `class_policy`.
	pub for_classes: BTreeSet<ClassId>,

	/// Used by default policies that match by explicit triple
	/// coordinates; `None` means "matches any".
	pub s_targets: Option<BTreeSet<SubjectId>>,
	pub p_targets: Option<BTreeSet<PropertyId>>,
	/// True iff this policy applies to every flake regardless of
	/// `s_targets`/`p_targets`.
	pub default_for_all: bool,

	/// Raw specs, kept only when any contained target is a query so
	/// transactions can re-resolve them against the post-stage
	/// database.
	pub raw_subject_specs: Option<Vec<TargetExpr>>,
	pub raw_property_specs: Option<Vec<TargetExpr>>,
}

impl CompiledPolicy {
	/// `applies_to_flake(policy, [s, p])`.
	pub fn applies_to_flake(&self, subject: &SubjectId, property: &PropertyId) -> bool {
		if self.default_for_all {
			return true;
		}
		let subject_ok = self.s_targets.as_ref().is_none_or(|targets| targets.contains(subject));
		let property_ok = self.p_targets.as_ref().is_none_or(|targets| targets.contains(property));
		subject_ok && property_ok
	}

	/// A class policy applies to `subject_classes` iff it never needed
	/// the check, or its target classes overlap the subject's classes.
	pub fn class_applies(&self, subject_classes: &HashSet<ClassId>) -> bool {
		if !self.class_check_needed {
			return true;
		}
		self.for_classes.iter().any(|class| subject_classes.contains(class))
	}
}

/// One side (view or modify) of the indexed policy store.
#[derive(Clone, Debug, Default)]
pub struct PolicyTree {
	pub property: HashMap<PropertyId, Vec<CompiledPolicy>>,
	pub subject: HashMap<SubjectId, Vec<CompiledPolicy>>,
	pub default: Vec<CompiledPolicy>,
	/// When true, this side is unrestricted: every triple is allowed
	/// without consulting the indexes (the unrestricted fast path).
	pub root: bool,
}

impl PolicyTree {
	pub fn is_empty(&self) -> bool {
		self.property.is_empty() && self.subject.is_empty() && self.default.is_empty()
	}

	/// An unrestricted tree: every triple is allowed via the fast path,
	/// without ever consulting `property`/`subject`/`default`.
	pub fn root() -> Self {
		Self { root: true, ..Self::default() }
	}
}

/// The compiled, immutable policy store attached to a database handle.
#[derive(Clone, Debug)]
pub struct PolicyWrapper {
	pub view: PolicyTree,
	pub modify: PolicyTree,
	pub policy_values: PolicyValues,
	pub default_allow: bool,
}

impl PolicyWrapper {
	/// `deny-all?`: true iff the modify
	/// tree carries no modify-capable policy at all, not merely that
	/// the struct is the zero value — callers that rely on this must
	/// not confuse it with `default_allow == false`.
	pub fn modify_is_empty(&self) -> bool {
		!self.modify.root && self.modify.is_empty()
	}

	/// The unrestricted wrapper: both view and modify allow every
	/// triple without consulting any index. Intended for database
	/// handles that opt out of policy enforcement entirely (e.g. a
	/// superuser connection, or a handle with no policy document
	/// registered at all).
	pub fn root(policy_values: PolicyValues) -> Self {
		Self { view: PolicyTree::root(), modify: PolicyTree::root(), policy_values, default_allow: true }
	}
}

/// Maps a subject to its class ids, filled lazily on first lookup and
/// scoped to a single enforcement context — one cache per view request,
/// a distinct one per transaction batch.
#[derive(Default)]
pub struct MembershipCache {
	filled: AsyncMutex<HashMap<SubjectId, HashSet<ClassId>>>,
}

impl MembershipCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Single-writer fill-on-miss: a concurrent miss on the same
	/// subject just re-fetches, which is safe since `class_ids` is a
	/// pure lookup.
	pub async fn get_or_fill(
		&self,
		storage: &dyn PolicyStorage,
		budget: &QueryBudget,
		subject: &SubjectId,
	) -> Result<HashSet<ClassId>, StorageError> {
		if let Some(hit) = self.filled.lock().await.get(subject) {
			return Ok(hit.clone());
		}
		let classes = storage.class_ids(budget, subject).await?;
		self.filled.lock().await.insert(subject.clone(), classes.clone());
		Ok(classes)
	}
}
