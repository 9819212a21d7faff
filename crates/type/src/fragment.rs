// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::fmt;

use serde::{Deserialize, Serialize};

/// A pointer to where a value came from: a position in a source
/// document, an internally-synthesized name, or nothing at all.
/// Attached to diagnostics so error messages can point back at the
/// offending policy document field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fragment {
	#[default]
	None,
	Internal(String),
	Owned {
		field: String,
		policy_id: Option<String>,
	},
}

impl Fragment {
	pub fn internal(name: impl Into<String>) -> Self {
		Self::Internal(name.into())
	}

	pub fn field(field: impl Into<String>, policy_id: Option<String>) -> Self {
		Self::Owned {
			field: field.into(),
			policy_id,
		}
	}
}

impl fmt::Display for Fragment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Fragment::None => write!(f, "<none>"),
			Fragment::Internal(name) => write!(f, "{name}"),
			Fragment::Owned {
				field,
				policy_id,
			} => match policy_id {
				Some(id) => write!(f, "{field} (policy {id})"),
				None => write!(f, "{field}"),
			},
		}
	}
}
