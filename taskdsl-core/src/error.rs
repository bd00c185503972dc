//! Error types for taskdsl-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::TaskLocator;

/// Errors raised while declaring, overriding or relocating task definitions.
///
/// Every variant is returned before the registry is touched, so a failed call
/// leaves both namespaces exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DslError {
    /// A scoped task was declared (or moved) under a scope whose name is
    /// already taken by a flat task. `scope` is also the colliding task name.
    #[error(
        "A clash was found while creating task '{task}' with scope '{scope}' since a task named '{scope}' already exists."
    )]
    TaskScopeClash { task: String, scope: String },

    /// A flat task was declared with the name of an existing scope.
    #[error("A clash was found while creating task '{task}', since a scope with that name already exists.")]
    ScopeTaskClash { task: String },

    /// A scope was created explicitly with the name of an existing flat task.
    #[error("A clash was found while creating scope '{scope}', since a task with that name already exists.")]
    ScopeCreationClash { scope: String },

    #[error("{kind} name must not be empty")]
    EmptyName { kind: &'static str },

    #[error("task {locator} is not defined")]
    TaskNotFound { locator: TaskLocator },
}

/// Errors produced when a task action is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The task was declared without an action and there is no earlier
    /// definition to fall back to.
    #[error("No action set for task {task}.")]
    ActionNotSet { task: String },

    /// `run_super` was called on a capability that has nothing to delegate to.
    #[error("there is no previous task definition to delegate to")]
    SuperNotDefined,

    #[error("task action failed: {0}")]
    Failed(String),
}

/// All errors that can arise from loading, saving or applying a task manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("task manifest not found at {path}")]
    ManifestNotFound { path: PathBuf },

    /// `dirs::home_dir()` returned `None` — cannot locate `~/.taskdsl/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// A manifest entry violated the registry's namespace rules.
    #[error(transparent)]
    Dsl(#[from] DslError),
}
