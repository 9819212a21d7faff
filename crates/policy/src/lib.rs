// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Compiles declarative policy documents into an immutable
//! [`PolicyWrapper`] and enforces view/modify access per triple.

mod class_expansion;
mod compiler;
pub mod enforce;
mod error;
mod model;
mod query_executor;
mod refresh;
mod target;
mod tracker;
mod values;
mod vocabulary;

pub use compiler::{CompileOptions, wrap_policy};
pub use enforce::{EnforcementContext, modify, view};
pub use error::{Error, Result};
pub use model::{CompiledPolicy, MembershipCache, PolicyKind, PolicyTree, PolicyWrapper};
pub use refresh::{refresh_for_batch, refresh_modify_policies};
pub use target::{TargetExpr, TargetResolver};
pub use tracker::ExecutionTracker;
pub use values::PolicyValues;
