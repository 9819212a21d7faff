// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! The JSON-LD policy vocabulary.

use serde_json::Value;

pub const KEY_ID: &str = "@id";
pub const KEY_ON_SUBJECT: &str = "f:onSubject";
pub const KEY_TARGET_SUBJECT: &str = "f:targetSubject";
pub const KEY_ON_PROPERTY: &str = "f:onProperty";
pub const KEY_TARGET_PROPERTY: &str = "f:targetProperty";
pub const KEY_ON_CLASS: &str = "f:onClass";
pub const KEY_ALLOW: &str = "f:allow";
pub const KEY_QUERY: &str = "f:query";
pub const KEY_REQUIRED: &str = "f:required";
pub const KEY_EX_MESSAGE: &str = "f:exMessage";
pub const KEY_ACTION: &str = "f:action";

pub const ACTION_VIEW: &str = "f:view";
pub const ACTION_MODIFY: &str = "f:modify";

/// Reads a targeting field that may be absent, a single value, or an
/// array of values (IRIs and/or subquery maps, mixed).
pub fn read_list(doc: &Value, key: &str) -> Vec<Value> {
	match doc.get(key) {
		None | Some(Value::Null) => Vec::new(),
		Some(Value::Array(items)) => items.clone(),
		Some(other) => vec![other.clone()],
	}
}

/// `onSubject ∪ targetSubject`, `onProperty ∪ targetProperty` —
/// combines the preferred and legacy-alias keys.
pub fn read_combined(doc: &Value, preferred: &str, legacy: &str) -> Vec<Value> {
	let mut combined = read_list(doc, preferred);
	combined.extend(read_list(doc, legacy));
	combined
}

pub fn read_on_class(doc: &Value) -> Vec<String> {
	read_list(doc, KEY_ON_CLASS).into_iter().filter_map(|v| v.as_str().map(str::to_string)).collect()
}

pub fn read_bool(doc: &Value, key: &str) -> bool {
	doc.get(key).and_then(Value::as_bool).unwrap_or(false)
}

pub fn read_string(doc: &Value, key: &str) -> Option<String> {
	doc.get(key).and_then(Value::as_str).map(str::to_string)
}

/// The `action` set: empty means both view and modify apply.
pub fn read_actions(doc: &Value) -> (bool, bool) {
	let actions = read_list(doc, KEY_ACTION);
	if actions.is_empty() {
		return (true, true);
	}
	let names: Vec<&str> = actions.iter().filter_map(Value::as_str).collect();
	(names.contains(&ACTION_VIEW), names.contains(&ACTION_MODIFY))
}
