// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! View-path end-to-end scenarios.

mod common;

use common::FakeStorage;
use reifydb_core::QueryBudget;
use reifydb_policy::enforce::{modify, view};
use reifydb_policy::{CompileOptions, EnforcementContext, PolicyValues, PolicyWrapper, wrap_policy};
use serde_json::json;

#[tokio::test]
async fn unrestricted_view_allows_everything() {
	let storage = FakeStorage::new();
	let wrapper = wrap_policy(&storage, &[], PolicyValues::empty(), true, &CompileOptions::default())
		.await
		.expect("empty rule set always compiles");

	let ctx = EnforcementContext::new(&storage, &wrapper);
	let budget = QueryBudget::unbounded();
	let subject = FakeStorage::sid("ex:a");
	let property = FakeStorage::sid("ex:anything");

	assert!(view::allow_flake(&ctx, &budget, &subject, &property).await.unwrap());
	assert!(view::allow_iri(&ctx, &budget, &subject).await.unwrap());
}

#[tokio::test]
async fn property_restriction_allows_named_property_only() {
	let storage = FakeStorage::new();
	let rules = vec![json!({
		"@id": "p1",
		"f:onProperty": ["ex:name"],
		"f:allow": true,
		"f:action": ["f:view"],
	})];
	let wrapper = wrap_policy(&storage, &rules, PolicyValues::empty(), false, &CompileOptions::default())
		.await
		.unwrap();

	let ctx = EnforcementContext::new(&storage, &wrapper);
	let budget = QueryBudget::unbounded();
	let subject = FakeStorage::sid("ex:alice");

	assert!(view::allow_flake(&ctx, &budget, &subject, &FakeStorage::sid("ex:name")).await.unwrap());
	assert!(!view::allow_flake(&ctx, &budget, &subject, &FakeStorage::sid("ex:ssn")).await.unwrap());
}

#[tokio::test]
async fn class_policy_with_disjoint_classes() {
	let storage = FakeStorage::new()
		.with_class("ex:ClassA", &["ex:p"])
		.with_class("ex:ClassB", &["ex:p"])
		.with_membership("ex:s_a", &["ex:ClassA"])
		.with_membership("ex:s_b", &["ex:ClassB"]);

	let rules = vec![json!({
		"@id": "p2",
		"f:onClass": ["ex:ClassA"],
		"f:allow": true,
	})];
	let wrapper = wrap_policy(&storage, &rules, PolicyValues::empty(), false, &CompileOptions::default())
		.await
		.unwrap();

	let entries = wrapper.view.property.get(&FakeStorage::sid("ex:p")).expect("expanded under property[p]");
	assert_eq!(entries.len(), 1);
	assert!(entries[0].class_check_needed, "p is shared by ClassA and ClassB, so the check cannot be skipped");
	assert_eq!(entries[0].for_classes, [FakeStorage::sid("ex:ClassA")].into_iter().collect());

	let ctx = EnforcementContext::new(&storage, &wrapper);
	let budget = QueryBudget::unbounded();
	let property = FakeStorage::sid("ex:p");

	assert!(view::allow_flake(&ctx, &budget, &FakeStorage::sid("ex:s_a"), &property).await.unwrap());
	assert!(!view::allow_flake(&ctx, &budget, &FakeStorage::sid("ex:s_b"), &property).await.unwrap());
}

#[tokio::test]
async fn implicit_id_property_always_needs_class_check() {
	let storage = FakeStorage::new()
		.with_class("ex:ClassA", &["ex:p"])
		.with_class("ex:ClassB", &["ex:p"])
		.with_membership("ex:s_a", &["ex:ClassA"])
		.with_membership("ex:s_b", &["ex:ClassB"]);

	let rules = vec![json!({
		"@id": "p2",
		"f:onClass": ["ex:ClassA"],
		"f:allow": true,
	})];
	let wrapper = wrap_policy(&storage, &rules, PolicyValues::empty(), false, &CompileOptions::default())
		.await
		.unwrap();

	let ctx = EnforcementContext::new(&storage, &wrapper);
	let budget = QueryBudget::unbounded();

	assert!(view::allow_iri(&ctx, &budget, &FakeStorage::sid("ex:s_a")).await.unwrap());
	assert!(!view::allow_iri(&ctx, &budget, &FakeStorage::sid("ex:s_b")).await.unwrap());
}

#[tokio::test]
async fn query_decision_allows_only_when_result_is_non_empty() {
	let mut bound_row = std::collections::BTreeMap::new();
	bound_row.insert("?$this".to_string(), json!("ex:has-access"));
	let storage = FakeStorage::new().with_query_result("has_access", vec![bound_row]);

	let rules = vec![
		json!({
			"@id": "q1",
			"f:onProperty": ["ex:secret"],
			"f:query": {"marker": "has_access"},
			"f:action": ["f:view"],
		}),
		json!({
			"@id": "q2",
			"f:onProperty": ["ex:other-secret"],
			"f:query": {"marker": "unregistered_marker"},
			"f:action": ["f:view"],
		}),
	];
	let wrapper = wrap_policy(&storage, &rules, PolicyValues::empty(), false, &CompileOptions::default())
		.await
		.unwrap();

	let ctx = EnforcementContext::new(&storage, &wrapper);
	let budget = QueryBudget::unbounded();
	let subject = FakeStorage::sid("ex:whoever");

	assert!(view::allow_flake(&ctx, &budget, &subject, &FakeStorage::sid("ex:secret")).await.unwrap());
	assert!(!view::allow_flake(&ctx, &budget, &subject, &FakeStorage::sid("ex:other-secret")).await.unwrap());
}

#[tokio::test]
async fn root_wrapper_allows_every_triple_on_view_and_modify() {
	let storage = FakeStorage::new();
	let wrapper = PolicyWrapper::root(PolicyValues::empty());

	let ctx = EnforcementContext::new(&storage, &wrapper);
	let budget = QueryBudget::unbounded();
	let subject = FakeStorage::sid("ex:whoever");
	let property = FakeStorage::sid("ex:whatever");

	assert!(view::allow_flake(&ctx, &budget, &subject, &property).await.unwrap());
	assert!(view::allow_iri(&ctx, &budget, &subject).await.unwrap());
	assert!(modify::authorize_flake(&ctx, &budget, &subject, &property).await.is_ok());
}

#[tokio::test]
async fn class_policy_skips_check_when_property_is_exclusive() {
	let storage = FakeStorage::new()
		.with_class("ex:ClassA", &["ex:exclusive_prop"])
		.with_membership("ex:s_a", &["ex:ClassA"])
		.with_membership("ex:s_other", &["ex:ClassB"]);

	let rules = vec![json!({
		"@id": "p3",
		"f:onClass": ["ex:ClassA"],
		"f:allow": true,
	})];
	let wrapper = wrap_policy(&storage, &rules, PolicyValues::empty(), false, &CompileOptions::default())
		.await
		.unwrap();

	let entries =
		wrapper.view.property.get(&FakeStorage::sid("ex:exclusive_prop")).expect("expanded under property index");
	assert_eq!(entries.len(), 1);
	assert!(
		!entries[0].class_check_needed,
		"ex:exclusive_prop is only reachable through ClassA, so the membership check is amortized away"
	);

	let ctx = EnforcementContext::new(&storage, &wrapper);
	let budget = QueryBudget::unbounded();
	let property = FakeStorage::sid("ex:exclusive_prop");

	// Even a subject with no recorded membership in ClassA is allowed,
	// because the skip path never consults the membership cache at all.
	assert!(view::allow_flake(&ctx, &budget, &FakeStorage::sid("ex:s_other"), &property).await.unwrap());
	assert!(view::allow_flake(&ctx, &budget, &FakeStorage::sid("ex:s_a"), &property).await.unwrap());
}
