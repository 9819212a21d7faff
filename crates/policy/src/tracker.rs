// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Records per-policy execution and allow counts for a single request.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

#[derive(Default)]
struct Counts {
	executions: AtomicU64,
	allows: AtomicU64,
}

/// Per-request execution/allow counters, keyed by policy id.
#[derive(Default)]
pub struct ExecutionTracker {
	counts: Mutex<HashMap<String, Arc<Counts>>>,
}

impl ExecutionTracker {
	pub fn new() -> Self {
		Self::default()
	}

	fn entry(&self, policy_id: &str) -> Arc<Counts> {
		self.counts.lock().entry(policy_id.to_string()).or_default().clone()
	}

	pub fn record_execution(&self, policy_id: &str) {
		self.entry(policy_id).executions.fetch_add(1, Ordering::Relaxed);
	}

	pub fn record_allow(&self, policy_id: &str) {
		self.entry(policy_id).allows.fetch_add(1, Ordering::Relaxed);
	}

	/// `(executions, allows)` per policy id, as of the call.
	pub fn snapshot(&self) -> HashMap<String, (u64, u64)> {
		self.counts
			.lock()
			.iter()
			.map(|(id, counts)| {
				(
					id.clone(),
					(
						counts.executions.load(Ordering::Relaxed),
						counts.allows.load(Ordering::Relaxed),
					),
				)
			})
			.collect()
	}
}
