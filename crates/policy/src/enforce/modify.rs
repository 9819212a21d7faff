// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! The modify path. Unlike
//! the view path, a denial here is a hard error: the transaction must
//! not proceed.

use reifydb_core::{PropertyId, QueryBudget, SubjectId};
use tracing::instrument;

use super::{EnforcementContext, Verdict, decide};
use crate::error::{Error, Result};

/// Authorizes modifying `[subject, property, _]`. Returns `Ok(())` if
/// the modification may proceed, `Err(Error::PolicyException)` if it
/// must be rejected.
#[instrument(name = "policy::enforce::modify::authorize_flake", level = "trace", skip(ctx))]
pub async fn authorize_flake(
	ctx: &EnforcementContext<'_>,
	budget: &QueryBudget,
	subject: &SubjectId,
	property: &PropertyId,
) -> Result<()> {
	match decide(ctx, budget, &ctx.wrapper.modify, subject, property).await? {
		Verdict::RootAllow | Verdict::Allowed => Ok(()),
		Verdict::NoCandidates => {
			if ctx.wrapper.default_allow {
				Ok(())
			} else {
				Err(Error::denied(None))
			}
		}
		Verdict::AllDenied {
			ex_message,
		} => Err(Error::denied(ex_message)),
	}
}
