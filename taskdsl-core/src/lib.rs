//! taskdsl core library — task and scope registry, actions, manifest.
//!
//! Public API surface:
//! - [`dsl`] — [`TasksDsl`], the registry tasks and scopes are declared into
//! - [`types`] — task/scope definitions and [`TaskLocator`]
//! - [`action`] — task actions and the run-super capability
//! - [`manifest`] — YAML manifest load / save / apply
//! - [`error`] — [`DslError`], [`ActionError`], [`ManifestError`]

pub mod action;
pub mod dsl;
pub mod error;
pub mod manifest;
pub mod types;

pub use action::{
    action_fn, constant_action, ActionFn, ActionFuture, ActionResult, NoSuper, RunContext,
    RunSuper, SuperAction, TaskAction, TaskArguments,
};
pub use dsl::{ScopeHandle, TaskHandle, TasksDsl};
pub use error::{ActionError, DslError, ManifestError};
pub use manifest::TaskManifest;
pub use types::{DefinitionId, ScopeDefinition, ScopeMap, TaskDefinition, TaskLocator, TaskMap};
