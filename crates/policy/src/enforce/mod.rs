// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Shared enforcement core for the view and modify paths. `view` and
//! `modify` differ only in how they turn a [`Verdict`] into a result —
//! the candidate-gathering and policy-evaluation order is identical
//! for both.

pub mod modify;
pub mod view;

use reifydb_core::{PolicyStorage, PropertyId, QueryBudget, SubjectId};

use crate::error::Result;
use crate::model::{CompiledPolicy, MembershipCache, PolicyKind, PolicyTree, PolicyWrapper};
use crate::query_executor;
use crate::tracker::ExecutionTracker;

/// Per-request enforcement state: the immutable wrapper plus a fresh
/// class-membership cache and execution tracker scoped to this view
/// request or transaction batch. Modify callers MUST construct a new
/// context per transaction batch rather than reuse a view context's
/// cache — the database view may change mid-batch.
pub struct EnforcementContext<'a> {
	pub storage: &'a dyn PolicyStorage,
	pub wrapper: &'a PolicyWrapper,
	pub cache: MembershipCache,
	pub tracker: ExecutionTracker,
}

impl<'a> EnforcementContext<'a> {
	pub fn new(storage: &'a dyn PolicyStorage, wrapper: &'a PolicyWrapper) -> Self {
		Self {
			storage,
			wrapper,
			cache: MembershipCache::new(),
			tracker: ExecutionTracker::new(),
		}
	}
}

pub(crate) enum Verdict {
	RootAllow,
	NoCandidates,
	Allowed,
	AllDenied {
		ex_message: Option<String>,
	},
}

/// `property ∪ subject ∪ default` in that order, `default` filtered by
/// `applies_to_flake`.
fn gather_candidates<'t>(
	tree: &'t PolicyTree,
	subject: &SubjectId,
	property: &PropertyId,
) -> Vec<&'t CompiledPolicy> {
	let mut candidates = Vec::new();
	if let Some(entries) = tree.property.get(property) {
		candidates.extend(entries);
	}
	if let Some(entries) = tree.subject.get(subject) {
		candidates.extend(entries);
	}
	candidates.extend(tree.default.iter().filter(|policy| policy.applies_to_flake(subject, property)));
	candidates
}

/// The shared decision procedure. Callers map
/// the returned [`Verdict`] to their path's result shape.
pub(crate) async fn decide(
	ctx: &EnforcementContext<'_>,
	budget: &QueryBudget,
	tree: &PolicyTree,
	subject: &SubjectId,
	property: &PropertyId,
) -> Result<Verdict> {
	if tree.root {
		return Ok(Verdict::RootAllow);
	}

	let candidates = gather_candidates(tree, subject, property);
	if candidates.is_empty() {
		return Ok(Verdict::NoCandidates);
	}

	let required: Vec<&CompiledPolicy> = candidates.iter().copied().filter(|policy| policy.required).collect();
	let to_eval = if required.is_empty() { candidates } else { required };

	let subject_classes = if to_eval.iter().any(|policy| policy.class_policy) {
		Some(ctx.cache.get_or_fill(ctx.storage, budget, subject).await?)
	} else {
		None
	};

	let mut first_ex_message = None;
	for policy in &to_eval {
		if policy.class_policy {
			let classes = subject_classes.as_ref().expect("class cache populated above");
			if !policy.class_applies(classes) {
				continue;
			}
		}

		ctx.tracker.record_execution(&policy.id);
		let allowed = match &policy.kind {
			PolicyKind::Allow(decision) => *decision,
			PolicyKind::DefaultDeny => false,
			PolicyKind::Query(query) => {
				let subject_iri = ctx.storage.sid_to_iri(subject);
				query_executor::execute(ctx.storage, budget, &ctx.wrapper.policy_values, query, &subject_iri)
					.await?
			}
		};

		if allowed {
			ctx.tracker.record_allow(&policy.id);
			return Ok(Verdict::Allowed);
		}
		if first_ex_message.is_none() {
			first_ex_message = policy.ex_message.clone();
		}
	}

	Ok(Verdict::AllDenied {
		ex_message: first_ex_message,
	})
}
