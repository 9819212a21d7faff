// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! A minimal class/property statistics catalog.
//!
//! Real deployments derive this from the index layer's per-class
//! column statistics; here it is a plain registry the policy compiler
//! consults through [`reifydb_core::PolicyStats`] when expanding
//! `onClass` targeting.

use std::collections::{BTreeSet, HashMap};

use reifydb_core::{ClassId, ClassPropertyStats, PolicyStats, PropertyId};
use tracing::instrument;

/// Catalog wrapper owning the class -> property-usage statistics.
///
/// Cheap to clone; callers that need a shared, mutable catalog should
/// wrap it in their own `Arc<RwLock<..>>` (this crate stays
/// concurrency-agnostic, matching `reifydb-transaction`'s stance on
/// owning no locking policy of its own).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
	classes: HashMap<ClassId, ClassPropertyStats>,
}

impl Catalog {
	pub fn new() -> Self {
		Self::default()
	}

	#[instrument(name = "catalog::class::register", level = "debug", skip(self, properties))]
	pub fn register_class(&mut self, class: ClassId, properties: BTreeSet<PropertyId>) {
		self.classes.insert(class, ClassPropertyStats {
			properties,
		});
	}

	#[instrument(name = "catalog::class::find", level = "trace", skip(self))]
	pub fn find_class(&self, class: &ClassId) -> Option<&ClassPropertyStats> {
		self.classes.get(class)
	}
}

impl PolicyStats for Catalog {
	fn classes(&self) -> &HashMap<ClassId, ClassPropertyStats> {
		&self.classes
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sid(name: &str) -> ClassId {
		ClassId::new(1, name)
	}

	#[test]
	fn unregistered_class_has_no_stats() {
		let catalog = Catalog::new();
		assert!(catalog.find_class(&sid("ex:Unknown")).is_none());
	}

	#[test]
	fn registered_class_is_found_by_id() {
		let mut catalog = Catalog::new();
		let properties: BTreeSet<PropertyId> = [sid("ex:name"), sid("ex:age")].into_iter().collect();
		catalog.register_class(sid("ex:Person"), properties.clone());

		let found = catalog.find_class(&sid("ex:Person")).expect("class was registered");
		assert_eq!(found.properties, properties);
		assert_eq!(catalog.classes().len(), 1);
	}
}
