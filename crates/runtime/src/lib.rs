// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Bounded-concurrency execution helpers.
//!
//! The target resolver runs one subquery per target expression and the
//! contract requires bounded parallelism of at least two in flight at
//! once. [`join_bounded`] interleaves the futures on the
//! calling task via a bounded `FuturesUnordered` rather than spawning
//! them, so borrowed storage handles stay valid without needing `'static`.

use std::future::Future;

use futures_util::stream::{self, StreamExt, TryStreamExt};

/// Minimum concurrency the contract requires the target resolver to use.
pub const MIN_CONCURRENCY: usize = 2;

/// Drives every future in `tasks` to completion with at most
/// `concurrency` in flight at once (raised to [`MIN_CONCURRENCY`] if
/// lower), preserving no particular completion order. Stops polling at
/// the first `Err`: outstanding futures that have not yet completed are
/// dropped rather than driven to completion, so one failing subquery
/// cancels the rest of the batch instead of merely being reported
/// alongside their results.
pub async fn join_bounded<T, E, Fut, I>(tasks: I, concurrency: usize) -> Result<Vec<T>, E>
where
	I: IntoIterator<Item = Fut>,
	Fut: Future<Output = Result<T, E>>,
{
	let concurrency = concurrency.max(MIN_CONCURRENCY);
	stream::iter(tasks).buffer_unordered(concurrency).try_collect().await
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn collects_all_outcomes_when_nothing_fails() {
		let tasks = (0..5).map(|i| async move { Ok::<_, ()>(i) });
		let mut results = join_bounded(tasks, 2).await.unwrap();
		results.sort_unstable();
		assert_eq!(results, vec![0, 1, 2, 3, 4]);
	}

	#[tokio::test]
	async fn short_circuits_on_first_error() {
		let tasks = (0..5).map(|i| async move { if i == 3 { Err("boom") } else { Ok::<u32, &'static str>(i) } });
		let result = join_bounded(tasks, 2).await;
		assert_eq!(result, Err("boom"));
	}
}
