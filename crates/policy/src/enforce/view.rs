// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! The view path.

use reifydb_core::{PropertyId, QueryBudget, SubjectId, id_property};
use tracing::instrument;

use super::{EnforcementContext, Verdict, decide};
use crate::error::Result;

/// Whether the caller may view `[subject, property, _]`. A deny is data,
/// not an error — the triple is simply omitted from query results.
#[instrument(name = "policy::enforce::view::allow_flake", level = "trace", skip(ctx))]
pub async fn allow_flake(
	ctx: &EnforcementContext<'_>,
	budget: &QueryBudget,
	subject: &SubjectId,
	property: &PropertyId,
) -> Result<bool> {
	match decide(ctx, budget, &ctx.wrapper.view, subject, property).await? {
		Verdict::RootAllow | Verdict::Allowed => Ok(true),
		Verdict::NoCandidates => Ok(ctx.wrapper.default_allow),
		Verdict::AllDenied {
			..
		} => Ok(false),
	}
}

/// Visibility of an IRI is tested by synthesising the flake
/// `[sid, @id, _]` and running the view path.
#[instrument(name = "policy::enforce::view::allow_iri", level = "trace", skip(ctx))]
pub async fn allow_iri(ctx: &EnforcementContext<'_>, budget: &QueryBudget, subject: &SubjectId) -> Result<bool> {
	allow_flake(ctx, budget, subject, &id_property()).await
}
