//! Domain types for the task registry.
//!
//! A [`TaskDefinition`] lives in exactly one namespace slot: the flat map of
//! [`crate::dsl::TasksDsl`] or the task map of one [`ScopeDefinition`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::action::{ActionFn, ActionFuture, RunContext, RunSuper, TaskAction, TaskArguments};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

static NEXT_DEFINITION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a constructed [`TaskDefinition`].
///
/// Overriding a task stores a definition with a fresh id, so two lookups that
/// return the same id observed the same definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionId(u64);

impl DefinitionId {
    fn next() -> Self {
        Self(NEXT_DEFINITION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Locator
// ---------------------------------------------------------------------------

/// Where a task is (or should be) registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskLocator {
    /// A task in the flat namespace.
    Flat(String),
    /// A task inside the named scope.
    Scoped { scope: String, task: String },
}

impl TaskLocator {
    pub fn flat(task: impl Into<String>) -> Self {
        Self::Flat(task.into())
    }

    pub fn scoped(scope: impl Into<String>, task: impl Into<String>) -> Self {
        Self::Scoped {
            scope: scope.into(),
            task: task.into(),
        }
    }

    /// The task name, regardless of namespace.
    pub fn task(&self) -> &str {
        match self {
            Self::Flat(task) => task,
            Self::Scoped { task, .. } => task,
        }
    }

    pub fn scope(&self) -> Option<&str> {
        match self {
            Self::Flat(_) => None,
            Self::Scoped { scope, .. } => Some(scope),
        }
    }
}

impl fmt::Display for TaskLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat(task) => write!(f, "'{task}'"),
            Self::Scoped { scope, task } => write!(f, "'{task}' in scope '{scope}'"),
        }
    }
}

impl From<&str> for TaskLocator {
    fn from(task: &str) -> Self {
        Self::flat(task)
    }
}

impl From<String> for TaskLocator {
    fn from(task: String) -> Self {
        Self::Flat(task)
    }
}

/// `(scope, task)`
impl From<(&str, &str)> for TaskLocator {
    fn from((scope, task): (&str, &str)) -> Self {
        Self::scoped(scope, task)
    }
}

impl From<(String, String)> for TaskLocator {
    fn from((scope, task): (String, String)) -> Self {
        Self::Scoped { scope, task }
    }
}

// ---------------------------------------------------------------------------
// Task definition
// ---------------------------------------------------------------------------

/// One declared task.
///
/// Equality is identity: two values compare equal only if they are the same
/// constructed definition.
#[derive(Debug)]
pub struct TaskDefinition {
    id: DefinitionId,
    name: String,
    scope: Option<String>,
    description: Option<String>,
    action: TaskAction,
    is_subtask: bool,
}

impl TaskDefinition {
    /// Build a definition without registering it anywhere.
    ///
    /// With `action == None` the definition gets [`TaskAction::NotSet`].
    pub fn new(
        name: impl Into<String>,
        scope: Option<String>,
        description: Option<String>,
        action: Option<ActionFn>,
        is_subtask: bool,
    ) -> Self {
        let name = name.into();
        let action = match action {
            Some(action) => TaskAction::Custom(action),
            None => TaskAction::NotSet { task: name.clone() },
        };
        Self {
            id: DefinitionId::next(),
            name,
            scope,
            description,
            action,
            is_subtask,
        }
    }

    pub fn id(&self) -> DefinitionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn action(&self) -> &TaskAction {
        &self.action
    }

    pub fn is_subtask(&self) -> bool {
        self.is_subtask
    }

    /// The slot this definition claims to occupy.
    pub fn locator(&self) -> TaskLocator {
        match &self.scope {
            Some(scope) => TaskLocator::scoped(scope.clone(), self.name.clone()),
            None => TaskLocator::flat(self.name.clone()),
        }
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn set_action(&mut self, action: ActionFn) {
        self.action = TaskAction::Custom(action);
    }

    /// Invoke this task's action. See [`TaskAction::invoke`].
    pub fn run(
        &self,
        args: TaskArguments,
        context: RunContext,
        run_super: Arc<dyn RunSuper>,
    ) -> ActionFuture {
        self.action.invoke(args, context, run_super)
    }

    pub(crate) fn set_scope(&mut self, scope: Option<String>) {
        self.scope = scope;
    }
}

impl PartialEq for TaskDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TaskDefinition {}

/// Flat namespace, keyed by task name. Iterates in name order.
pub type TaskMap = BTreeMap<String, TaskDefinition>;

// ---------------------------------------------------------------------------
// Scope definition
// ---------------------------------------------------------------------------

/// A named sub-namespace with its own task map.
#[derive(Debug)]
pub struct ScopeDefinition {
    name: String,
    description: Option<String>,
    tasks: TaskMap,
}

impl ScopeDefinition {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            tasks: TaskMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tasks(&self) -> &TaskMap {
        &self.tasks
    }

    pub fn task(&self, name: &str) -> Option<&TaskDefinition> {
        self.tasks.get(name)
    }

    /// First write wins: an existing description is never replaced.
    pub(crate) fn fill_description(&mut self, description: Option<&str>) {
        if self.description.is_none() {
            self.description = description.map(str::to_owned);
        }
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut TaskMap {
        &mut self.tasks
    }
}

/// Scope namespace, keyed by scope name.
pub type ScopeMap = BTreeMap<String, ScopeDefinition>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
