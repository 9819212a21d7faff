// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Modify-path end-to-end scenarios.

mod common;

use common::FakeStorage;
use reifydb_core::QueryBudget;
use reifydb_policy::enforce::modify;
use reifydb_policy::{CompileOptions, EnforcementContext, Error, PolicyValues, wrap_policy};
use serde_json::json;

#[tokio::test]
async fn required_denial_wins_over_permissive_allow() {
	let storage = FakeStorage::new();
	let rules = vec![
		json!({"@id": "r1", "f:allow": true, "f:required": false}),
		json!({"@id": "r2", "f:allow": false, "f:required": true, "f:exMessage": "nope"}),
	];
	let wrapper = wrap_policy(&storage, &rules, PolicyValues::empty(), true, &CompileOptions::default())
		.await
		.unwrap();

	let ctx = EnforcementContext::new(&storage, &wrapper);
	let budget = QueryBudget::unbounded();
	let subject = FakeStorage::sid("ex:anything");
	let property = FakeStorage::sid("ex:anything");

	let err = modify::authorize_flake(&ctx, &budget, &subject, &property).await.unwrap_err();
	match err {
		Error::PolicyException {
			message,
		} => assert_eq!(message, "nope"),
		other => panic!("expected PolicyException, got {other:?}"),
	}
}

#[tokio::test]
async fn allow_false_never_grants_even_when_required() {
	let storage = FakeStorage::new();
	let rules = vec![json!({"@id": "r1", "f:allow": false, "f:required": true})];
	let wrapper = wrap_policy(&storage, &rules, PolicyValues::empty(), true, &CompileOptions::default())
		.await
		.unwrap();

	let ctx = EnforcementContext::new(&storage, &wrapper);
	let budget = QueryBudget::unbounded();
	let subject = FakeStorage::sid("ex:anything");
	let property = FakeStorage::sid("ex:anything");

	assert!(modify::authorize_flake(&ctx, &budget, &subject, &property).await.is_err());
}

#[tokio::test]
async fn no_candidates_falls_back_to_default_allow() {
	let storage = FakeStorage::new();
	let rules = vec![json!({
		"@id": "p1",
		"f:onProperty": ["ex:name"],
		"f:allow": true,
	})];
	let wrapper = wrap_policy(&storage, &rules, PolicyValues::empty(), true, &CompileOptions::default())
		.await
		.unwrap();

	let ctx = EnforcementContext::new(&storage, &wrapper);
	let budget = QueryBudget::unbounded();
	let subject = FakeStorage::sid("ex:anything");
	let unrelated_property = FakeStorage::sid("ex:unrelated");

	assert!(modify::authorize_flake(&ctx, &budget, &subject, &unrelated_property).await.is_ok());
}
