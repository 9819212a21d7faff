// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use reifydb_core::StorageError;
use reifydb_type::Fragment;

/// The error envelope this crate returns.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// A policy document was rejected at compile time. Always
	/// surfaced, never swallowed.
	#[error("invalid policy: {reason}")]
	InvalidPolicy {
		reason: String,
		fragment: Fragment,
	},

	/// A modify-path denial after evaluation; carries the per-policy
	/// `exMessage` when one was supplied.
	#[error("{message}")]
	PolicyException {
		message: String,
	},

	/// An infrastructural failure: stats unavailable for `onClass`,
	/// a policy-query internal error, or a timed-out policy query.
	#[error("policy engine error: {reason}")]
	PolicyError {
		reason: String,
	},

	/// Opaque storage-layer failure, propagated unchanged.
	#[error(transparent)]
	Storage(#[from] StorageError),
}

impl Error {
	pub fn invalid_policy(reason: impl Into<String>, fragment: Fragment) -> Self {
		Self::InvalidPolicy {
			reason: reason.into(),
			fragment,
		}
	}

	pub fn policy_error(reason: impl Into<String>) -> Self {
		Self::PolicyError {
			reason: reason.into(),
		}
	}

	/// Builds the modify-path denial message:
	/// the first non-null `exMessage` among the denying policies, or
	/// the generic fallback.
	pub fn denied(ex_message: Option<String>) -> Self {
		Self::PolicyException {
			message: ex_message.unwrap_or_else(|| "Policy enforcement prevents modification.".to_string()),
		}
	}

	/// The `status` field of the error envelope.
	pub fn status(&self) -> u16 {
		match self {
			Error::InvalidPolicy {
				..
			} => 400,
			Error::PolicyException {
				..
			} => 403,
			Error::PolicyError {
				..
			} => 500,
			Error::Storage(_) => 500,
		}
	}

	/// The `error` kind field of the error envelope.
	pub fn kind(&self) -> &'static str {
		match self {
			Error::InvalidPolicy {
				..
			} => "InvalidPolicy",
			Error::PolicyException {
				..
			} => "PolicyException",
			Error::PolicyError {
				..
			} => "PolicyError",
			Error::Storage(_) => "StorageError",
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;
