// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! The policy compiler: parses each policy document,
//! normalizes targeting, expands class targeting into property-indexed
//! entries, and emits a [`PolicyWrapper`].

use std::collections::BTreeSet;

use reifydb_core::{ClassId, PolicyStorage, PropertyId, QueryBudget, SubjectId};
use reifydb_rql::ParsedQuery;
use reifydb_type::Fragment;
use serde_json::Value;
use tracing::instrument;

use crate::class_expansion;
use crate::error::{Error, Result};
use crate::model::{CompiledPolicy, PolicyKind, PolicyTree, PolicyWrapper};
use crate::target::{TargetExpr, TargetResolver};
use crate::values::PolicyValues;
use crate::vocabulary::{self, KEY_ID};

/// Compile-time tunables.
#[derive(Clone, Debug)]
pub struct CompileOptions {
	pub subquery_concurrency: usize,
}

impl Default for CompileOptions {
	fn default() -> Self {
		Self {
			subquery_concurrency: 4,
		}
	}
}

/// A policy document after target resolution but before classification
/// into the wrapper's indexed buckets. `has_subject_targeting` /
/// `has_property_targeting` record whether the document *declared*
/// targeting, independent of whether that targeting currently resolves
/// to any SIDs — a dynamic (`query`-backed) target can legitimately
/// resolve to the empty set today and grow via `refresh` tomorrow.
pub(crate) struct NormalizedPolicy {
	pub id: String,
	pub kind: PolicyKind,
	pub required: bool,
	pub ex_message: Option<String>,
	pub view: bool,
	pub modify: bool,
	pub subject_specs: BTreeSet<SubjectId>,
	pub property_specs: BTreeSet<PropertyId>,
	pub on_class: BTreeSet<ClassId>,
	pub has_subject_targeting: bool,
	pub has_property_targeting: bool,
	pub subject_is_dynamic: bool,
	pub property_is_dynamic: bool,
	pub raw_subject_specs: Option<Vec<TargetExpr>>,
	pub raw_property_specs: Option<Vec<TargetExpr>>,
}

/// Compiles `rules` into a [`PolicyWrapper`] attached to a database
/// handle.
#[instrument(name = "policy::compiler::wrap_policy", level = "debug", skip(storage, rules, values))]
pub async fn wrap_policy(
	storage: &dyn PolicyStorage,
	rules: &[Value],
	values: PolicyValues,
	default_allow: bool,
	options: &CompileOptions,
) -> Result<PolicyWrapper> {
	let values = values.ensure_ground_identity();

	let mut view = PolicyTree::default();
	let mut modify = PolicyTree::default();

	for rule in rules {
		let normalized = normalize_document(storage, &values, options, rule).await?;
		classify(storage, normalized, &mut view, &mut modify)?;
	}

	Ok(PolicyWrapper {
		view,
		modify,
		policy_values: values,
		default_allow,
	})
}

#[instrument(name = "policy::compiler::normalize", level = "trace", skip(storage, values, options, raw))]
async fn normalize_document(
	storage: &dyn PolicyStorage,
	values: &PolicyValues,
	options: &CompileOptions,
	raw: &Value,
) -> Result<NormalizedPolicy> {
	let id = vocabulary::read_string(raw, KEY_ID).unwrap_or_else(|| "<anonymous>".to_string());
	let required = vocabulary::read_bool(raw, vocabulary::KEY_REQUIRED);
	let ex_message = vocabulary::read_string(raw, vocabulary::KEY_EX_MESSAGE);
	let (view, modify) = vocabulary::read_actions(raw);

	let kind = parse_decision(raw, &id)?;

	let raw_subjects = vocabulary::read_combined(raw, vocabulary::KEY_ON_SUBJECT, vocabulary::KEY_TARGET_SUBJECT);
	let raw_properties =
		vocabulary::read_combined(raw, vocabulary::KEY_ON_PROPERTY, vocabulary::KEY_TARGET_PROPERTY);
	let on_class_iris = vocabulary::read_on_class(raw);

	let has_subject_targeting = !raw_subjects.is_empty();
	let has_property_targeting = !raw_properties.is_empty();

	let subject_exprs = raw_subjects.iter().map(TargetExpr::parse).collect::<Result<Vec<_>>>()?;
	let property_exprs = raw_properties.iter().map(TargetExpr::parse).collect::<Result<Vec<_>>>()?;
	let subject_is_dynamic = subject_exprs.iter().any(is_query);
	let property_is_dynamic = property_exprs.iter().any(is_query);

	let budget = QueryBudget::unbounded();
	let subject_specs =
		TargetResolver::resolve(storage, &budget, values, options.subquery_concurrency, &subject_exprs)
			.await?;
	let property_specs =
		TargetResolver::resolve(storage, &budget, values, options.subquery_concurrency, &property_exprs)
			.await?;
	let on_class: BTreeSet<ClassId> = on_class_iris.iter().map(|iri| storage.iri_to_sid(iri)).collect();

	if matches!(kind, PolicyKind::DefaultDeny) && !has_subject_targeting && !has_property_targeting && on_class.is_empty()
	{
		return Err(Error::invalid_policy(
			format!("policy {id} has neither a decision (allow/query) nor any targeting"),
			Fragment::field("(root)", Some(id)),
		));
	}

	Ok(NormalizedPolicy {
		id,
		kind,
		required,
		ex_message,
		view,
		modify,
		subject_specs,
		property_specs,
		on_class,
		has_subject_targeting,
		has_property_targeting,
		subject_is_dynamic,
		property_is_dynamic,
		raw_subject_specs: subject_is_dynamic.then_some(subject_exprs),
		raw_property_specs: property_is_dynamic.then_some(property_exprs),
	})
}

fn is_query(expr: &TargetExpr) -> bool {
	matches!(expr, TargetExpr::Query(_))
}

fn parse_decision(raw: &Value, id: &str) -> Result<PolicyKind> {
	if let Some(allow) = raw.get(vocabulary::KEY_ALLOW).and_then(Value::as_bool) {
		return Ok(PolicyKind::Allow(allow));
	}
	if let Some(query) = raw.get(vocabulary::KEY_QUERY) {
		if query.is_object() {
			let parsed = ParsedQuery::parse_target(query.clone())
				.map_err(|err| Error::invalid_policy(err.to_string(), Fragment::field(vocabulary::KEY_QUERY, Some(id.to_string()))))?;
			return Ok(PolicyKind::Query(parsed));
		}
	}
	Ok(PolicyKind::DefaultDeny)
}

/// Classifies a normalized document into the wrapper's indexed buckets.
/// Only targeting that is fully static (plain IRIs, nothing
/// query-backed) is hash-indexed by property/subject —
/// `refresh_modify_policies` only ever re-resolves `modify.default`, so
/// any dynamic targeting, any policy targeting both dimensions, and any
/// policy with no targeting at all must live there.
fn classify(
	storage: &dyn PolicyStorage,
	doc: NormalizedPolicy,
	view: &mut PolicyTree,
	modify: &mut PolicyTree,
) -> Result<()> {
	if !doc.on_class.is_empty() {
		if doc.has_subject_targeting || doc.has_property_targeting {
			return Err(Error::invalid_policy(
				format!(
					"policy {} combines onClass with explicit onSubject/onProperty targeting, which is not supported — class-expanded entries are indexed purely by property and cannot also be narrowed by subject/property coordinates",
					doc.id
				),
				Fragment::field("onClass", Some(doc.id.clone())),
			));
		}
		let stats = storage.stats().ok_or_else(|| {
			Error::policy_error(format!("policy {} uses onClass but no class statistics are available", doc.id))
		})?;
		for (property, entry) in class_expansion::expand(&doc, stats) {
			if entry.view {
				view.property.entry(property.clone()).or_default().push(entry.clone());
			}
			if entry.modify {
				modify.property.entry(property).or_default().push(entry);
			}
		}
		return Ok(());
	}

	let static_property_only =
		doc.has_property_targeting && !doc.property_is_dynamic && !doc.has_subject_targeting;
	let static_subject_only =
		doc.has_subject_targeting && !doc.subject_is_dynamic && !doc.has_property_targeting;

	if static_property_only {
		for property in doc.property_specs.iter().cloned() {
			let entry = CompiledPolicy {
				id: doc.id.clone(),
				kind: doc.kind.clone(),
				required: doc.required,
				ex_message: doc.ex_message.clone(),
				view: doc.view,
				modify: doc.modify,
				class_policy: false,
				class_check_needed: false,
				for_classes: BTreeSet::new(),
				s_targets: None,
				p_targets: None,
				default_for_all: false,
				raw_subject_specs: None,
				raw_property_specs: None,
			};
			if doc.view {
				view.property.entry(property.clone()).or_default().push(entry.clone());
			}
			if doc.modify {
				modify.property.entry(property).or_default().push(entry);
			}
		}
		return Ok(());
	}

	if static_subject_only {
		for subject in doc.subject_specs.iter().cloned() {
			let entry = CompiledPolicy {
				id: doc.id.clone(),
				kind: doc.kind.clone(),
				required: doc.required,
				ex_message: doc.ex_message.clone(),
				view: doc.view,
				modify: doc.modify,
				class_policy: false,
				class_check_needed: false,
				for_classes: BTreeSet::new(),
				s_targets: None,
				p_targets: None,
				default_for_all: false,
				raw_subject_specs: None,
				raw_property_specs: None,
			};
			if doc.view {
				view.subject.entry(subject.clone()).or_default().push(entry.clone());
			}
			if doc.modify {
				modify.subject.entry(subject).or_default().push(entry);
			}
		}
		return Ok(());
	}

	// Dynamic targeting (possibly still empty pending refresh), targeting
	// on both dimensions at once, or no targeting at all.
	let default_for_all = !doc.has_subject_targeting && !doc.has_property_targeting;
	let entry = CompiledPolicy {
		id: doc.id.clone(),
		kind: doc.kind,
		required: doc.required,
		ex_message: doc.ex_message,
		view: doc.view,
		modify: doc.modify,
		class_policy: false,
		class_check_needed: false,
		for_classes: BTreeSet::new(),
		s_targets: if doc.has_subject_targeting { Some(doc.subject_specs) } else { None },
		p_targets: if doc.has_property_targeting { Some(doc.property_specs) } else { None },
		default_for_all,
		raw_subject_specs: doc.raw_subject_specs,
		raw_property_specs: doc.raw_property_specs,
	};
	if doc.view {
		view.default.push(entry.clone());
	}
	if doc.modify {
		modify.default.push(entry);
	}
	Ok(())
}
