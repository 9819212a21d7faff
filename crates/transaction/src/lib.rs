// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Transaction-scoped storage handles.
//!
//! The policy engine needs exactly one thing from a transaction: the
//! pair of storage views that bracket a write batch, so it can
//! re-resolve query-based policy targets against the post-stage
//! database before enforcing them.

use reifydb_core::PolicyStorage;

/// Monotonically increasing transaction identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(pub u64);

/// The before/after storage views of a single write batch.
pub struct TransactionBatch<'a> {
	pub id: TransactionId,
	pub before: &'a dyn PolicyStorage,
	pub after: &'a dyn PolicyStorage,
}

impl<'a> TransactionBatch<'a> {
	pub fn new(id: TransactionId, before: &'a dyn PolicyStorage, after: &'a dyn PolicyStorage) -> Self {
		Self {
			id,
			before,
			after,
		}
	}
}
