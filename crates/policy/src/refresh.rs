// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Re-resolves query-backed modify targets against the post-stage
//! database before a transaction evaluates.

use reifydb_core::{PolicyStorage, QueryBudget};
use reifydb_transaction::TransactionBatch;
use tracing::instrument;

use crate::error::Result;
use crate::model::{CompiledPolicy, PolicyWrapper};
use crate::target::TargetResolver;
use crate::values::PolicyValues;

/// Convenience wrapper over [`refresh_modify_policies`] for callers that
/// already hold a [`TransactionBatch`]: refreshes against `batch.after`,
/// the post-stage database.
pub async fn refresh_for_batch(
	wrapper: &PolicyWrapper,
	batch: &TransactionBatch<'_>,
	budget: &QueryBudget,
	concurrency: usize,
) -> Result<PolicyWrapper> {
	refresh_modify_policies(wrapper, batch.after, budget, concurrency).await
}

/// Walks `modify.default`, re-resolving any policy whose raw subject or
/// property specs contained a query against `db_after`, and unions
/// freshly-resolved SIDs into `s_targets` / `p_targets`. Returns a new
/// wrapper scoped to this transaction batch — the canonical compiled
/// wrapper is left untouched so it may still be shared across other,
/// concurrent transactions.
#[instrument(name = "policy::refresh::refresh_modify_policies", level = "debug", skip(wrapper, storage))]
pub async fn refresh_modify_policies(
	wrapper: &PolicyWrapper,
	storage: &dyn PolicyStorage,
	budget: &QueryBudget,
	concurrency: usize,
) -> Result<PolicyWrapper> {
	let mut modify = wrapper.modify.clone();
	for policy in &mut modify.default {
		refresh_one(policy, storage, budget, &wrapper.policy_values, concurrency).await?;
	}

	Ok(PolicyWrapper {
		view: wrapper.view.clone(),
		modify,
		policy_values: wrapper.policy_values.clone(),
		default_allow: wrapper.default_allow,
	})
}

async fn refresh_one(
	policy: &mut CompiledPolicy,
	storage: &dyn PolicyStorage,
	budget: &QueryBudget,
	values: &PolicyValues,
	concurrency: usize,
) -> Result<()> {
	if let Some(raw_subjects) = &policy.raw_subject_specs {
		let resolved = TargetResolver::resolve(storage, budget, values, concurrency, raw_subjects).await?;
		let mut merged = policy.s_targets.clone().unwrap_or_default();
		merged.extend(resolved);
		policy.s_targets = Some(merged);
	}

	if let Some(raw_properties) = &policy.raw_property_specs {
		let resolved = TargetResolver::resolve(storage, budget, values, concurrency, raw_properties).await?;
		let mut merged = policy.p_targets.clone().unwrap_or_default();
		merged.extend(resolved);
		policy.p_targets = Some(merged);
	}

	Ok(())
}
