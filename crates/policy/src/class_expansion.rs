// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Expands an `onClass` rule into property-indexed entries. Class
//! policies are never stored under a class index at enforcement time;
//! a single O(1) lookup keyed by property suffices, with the class
//! membership test amortized and skipped whenever a property is
//! exclusive to the targeted classes.

use std::collections::{BTreeSet, HashMap};

use bumpalo::Bump;
use reifydb_core::{ClassId, PolicyStats, PropertyId, id_property, type_property};

use crate::compiler::NormalizedPolicy;
use crate::model::CompiledPolicy;

/// Returns one `(property, entry)` pair per property reached by the
/// policy's target classes; callers index the entry into their
/// property bucket under the paired key.
pub fn expand(doc: &NormalizedPolicy, stats: &dyn PolicyStats) -> Vec<(PropertyId, CompiledPolicy)> {
	if doc.on_class.is_empty() {
		return Vec::new();
	}

	// Scratch arena for the intermediate per-property class sets built
	// while inverting the class -> properties map; everything here is
	// cloned into the owned `CompiledPolicy` entries below before the
	// arena is dropped at the end of this call.
	let arena = Bump::new();
	let property_to_classes = invert_on_class(doc, stats, &arena);

	let id_prop = id_property();
	let type_prop = type_property();

	property_to_classes
		.into_iter()
		.map(|(property, classes_using_in_policy)| {
			let is_keyword = property == id_prop || property == type_prop;
			let all_classes_using_property: BTreeSet<ClassId> = stats
				.classes()
				.iter()
				.filter(|(_, class_stats)| class_stats.properties.contains(&property))
				.map(|(class, _)| class.clone())
				.collect();

			let class_check_needed =
				is_keyword || classes_using_in_policy.len() < all_classes_using_property.len();

			let entry = CompiledPolicy {
				id: doc.id.clone(),
				kind: doc.kind.clone(),
				required: doc.required,
				ex_message: doc.ex_message.clone(),
				view: doc.view,
				modify: doc.modify,
				class_policy: true,
				class_check_needed,
				for_classes: classes_using_in_policy,
				// `onClass` combined with explicit subject/property
				// targeting is rejected at compile time (`compiler::classify`),
				// so a class-expanded entry never carries triple-coordinate
				// targeting of its own — it is dispatched purely by property,
				// narrowed only by `class_check_needed`/`for_classes`.
				s_targets: None,
				p_targets: None,
				default_for_all: false,
				raw_subject_specs: None,
				raw_property_specs: None,
			};
			(property, entry)
		})
		.collect()
}

fn invert_on_class<'a>(
	doc: &NormalizedPolicy,
	stats: &dyn PolicyStats,
	arena: &'a Bump,
) -> HashMap<PropertyId, BTreeSet<ClassId>> {
	let mut by_property: HashMap<PropertyId, Vec<&'a ClassId>> = HashMap::new();

	for class in &doc.on_class {
		let Some(class_stats) = stats.classes().get(class) else {
			continue;
		};
		let interned = arena.alloc(class.clone());
		for property in &class_stats.properties {
			by_property.entry(property.clone()).or_default().push(interned);
		}
	}

	let mut property_to_classes: HashMap<PropertyId, BTreeSet<ClassId>> = by_property
		.into_iter()
		.map(|(property, classes)| (property, classes.into_iter().cloned().collect()))
		.collect();

	// @id and @type are carried by every subject, so within this
	// policy's scope they apply to exactly the targeted classes.
	let on_class_set: BTreeSet<ClassId> = doc.on_class.iter().cloned().collect();
	property_to_classes.entry(id_property()).or_insert_with(|| on_class_set.clone());
	property_to_classes.entry(type_property()).or_insert_with(|| on_class_set);

	property_to_classes
}
