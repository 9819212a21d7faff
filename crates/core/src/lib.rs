// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Identifiers, the flake model, and the storage contracts the policy
//! engine invokes. The storage engine, index layer, and query executor
//! themselves live outside this crate; only their interfaces do.

pub mod flake;
pub mod id;
pub mod interface;

pub use flake::{Flake, FlakeValue};
pub use id::{ClassId, PropertyId, SubjectId, id_property, type_property};
pub use interface::policy::{
	BoxFuture, ClassPropertyStats, IndexRangeOpts, PolicyStats, PolicyStorage, QueryBudget, ResultRow,
	ResultRows, StorageError,
};
