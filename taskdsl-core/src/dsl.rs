//! The task declaration DSL.
//!
//! # Namespaces
//!
//! ```text
//! tasks:   compile, test, ...            (flat)
//! scopes:  solidity -> { description, tasks: compile, ... }
//! ```
//!
//! No string is ever a key of both `tasks` and `scopes`. Every insertion point
//! checks this before mutating anything:
//!
//! | operation                         | existing entry | result                |
//! |-----------------------------------|----------------|-----------------------|
//! | flat task `X`                     | scope `X`      | `ScopeTaskClash`      |
//! | scoped task under `X`             | flat task `X`  | `TaskScopeClash`      |
//! | explicit scope `X`                | flat task `X`  | `ScopeCreationClash`  |
//! | move task into scope `X`          | flat task `X`  | `TaskScopeClash`      |
//!
//! Declaring into an occupied slot of the same namespace overrides it.

use std::ops::Deref;

use crate::action::ActionFn;
use crate::error::DslError;
use crate::types::{ScopeDefinition, ScopeMap, TaskDefinition, TaskLocator, TaskMap};

/// Registry of declared tasks and scopes.
#[derive(Debug, Default)]
pub struct TasksDsl {
    tasks: TaskMap,
    scopes: ScopeMap,
}

impl TasksDsl {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Declaration
    // -----------------------------------------------------------------------

    /// Declare (or override) a task.
    ///
    /// `locator` is a bare name for the flat namespace or `(scope, name)`.
    pub fn task(
        &mut self,
        locator: impl Into<TaskLocator>,
        description: Option<&str>,
        action: Option<ActionFn>,
    ) -> Result<TaskHandle<'_>, DslError> {
        self.declare_task(locator.into(), description, action, false)
    }

    /// Declare (or override) a subtask.
    pub fn subtask(
        &mut self,
        locator: impl Into<TaskLocator>,
        description: Option<&str>,
        action: Option<ActionFn>,
    ) -> Result<TaskHandle<'_>, DslError> {
        self.declare_task(locator.into(), description, action, true)
    }

    /// Alias of [`TasksDsl::subtask`].
    pub fn internal_task(
        &mut self,
        locator: impl Into<TaskLocator>,
        description: Option<&str>,
        action: Option<ActionFn>,
    ) -> Result<TaskHandle<'_>, DslError> {
        self.subtask(locator, description, action)
    }

    /// Create a new definition and store it at `locator`, replacing whatever
    /// was there. The returned handle always refers to the new definition.
    pub fn declare_task(
        &mut self,
        locator: TaskLocator,
        description: Option<&str>,
        action: Option<ActionFn>,
        is_subtask: bool,
    ) -> Result<TaskHandle<'_>, DslError> {
        validate_name("task", locator.task())?;
        let description = description.map(str::to_owned);

        match &locator {
            TaskLocator::Flat(name) => {
                if self.scopes.contains_key(name) {
                    return Err(DslError::ScopeTaskClash { task: name.clone() });
                }
                let definition =
                    TaskDefinition::new(name.clone(), None, description, action, is_subtask);
                store(&mut self.tasks, definition);
            }
            TaskLocator::Scoped { scope, task } => {
                validate_name("scope", scope)?;
                if self.tasks.contains_key(scope) {
                    return Err(DslError::TaskScopeClash {
                        task: task.clone(),
                        scope: scope.clone(),
                    });
                }
                let definition = TaskDefinition::new(
                    task.clone(),
                    Some(scope.clone()),
                    description,
                    action,
                    is_subtask,
                );
                store(self.scope_entry(scope).tasks_mut(), definition);
            }
        }

        tracing::debug!(task = %locator, subtask = is_subtask, "declared task");
        Ok(TaskHandle { dsl: self, locator })
    }

    /// Create a scope explicitly, or reuse it if it already exists.
    ///
    /// `description` is only recorded if the scope has none yet.
    pub fn scope(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<ScopeHandle<'_>, DslError> {
        validate_name("scope", name)?;
        if self.tasks.contains_key(name) {
            return Err(DslError::ScopeCreationClash {
                scope: name.to_owned(),
            });
        }
        self.scope_entry(name).fill_description(description);
        Ok(ScopeHandle {
            dsl: self,
            name: name.to_owned(),
        })
    }

    // -----------------------------------------------------------------------
    // Relocation
    // -----------------------------------------------------------------------

    /// Move the definition at `locator` into `new_scope`, keeping its name.
    ///
    /// The destination scope is created if absent; `description` fills in the
    /// scope description only when it has none. A task already stored under
    /// the same name in the destination is overridden. On error nothing is
    /// mutated.
    ///
    /// Moving a flat task into a scope of its own name is allowed, since the
    /// flat entry is vacated by the move itself.
    pub fn move_task(
        &mut self,
        locator: &TaskLocator,
        new_scope: &str,
        description: Option<&str>,
    ) -> Result<TaskLocator, DslError> {
        validate_name("scope", new_scope)?;
        if self.definition(locator).is_none() {
            return Err(DslError::TaskNotFound {
                locator: locator.clone(),
            });
        }

        let vacates_clash = matches!(locator, TaskLocator::Flat(name) if name == new_scope);
        if self.tasks.contains_key(new_scope) && !vacates_clash {
            return Err(DslError::TaskScopeClash {
                task: locator.task().to_owned(),
                scope: new_scope.to_owned(),
            });
        }

        let Some(mut definition) = self.take(locator) else {
            return Err(DslError::TaskNotFound {
                locator: locator.clone(),
            });
        };
        definition.set_scope(Some(new_scope.to_owned()));
        let destination = definition.locator();

        let scope = self.scope_entry(new_scope);
        scope.fill_description(description);
        store(scope.tasks_mut(), definition);

        tracing::debug!(from = %locator, to = %destination, "moved task");
        Ok(destination)
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// The flat namespace.
    pub fn task_definitions(&self) -> &TaskMap {
        &self.tasks
    }

    /// The scope namespace.
    pub fn scope_definitions(&self) -> &ScopeMap {
        &self.scopes
    }

    pub fn definition(&self, locator: &TaskLocator) -> Option<&TaskDefinition> {
        match locator {
            TaskLocator::Flat(name) => self.tasks.get(name),
            TaskLocator::Scoped { scope, task } => self.scopes.get(scope)?.task(task),
        }
    }

    pub(crate) fn definition_mut(
        &mut self,
        locator: &TaskLocator,
    ) -> Option<&mut TaskDefinition> {
        match locator {
            TaskLocator::Flat(name) => self.tasks.get_mut(name),
            TaskLocator::Scoped { scope, task } => {
                self.scopes.get_mut(scope)?.tasks_mut().get_mut(task)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn scope_entry(&mut self, name: &str) -> &mut ScopeDefinition {
        self.scopes.entry(name.to_owned()).or_insert_with(|| {
            tracing::debug!(scope = name, "created scope");
            ScopeDefinition::new(name)
        })
    }

    /// Remove a definition from its slot. Empty scopes are kept.
    fn take(&mut self, locator: &TaskLocator) -> Option<TaskDefinition> {
        match locator {
            TaskLocator::Flat(name) => self.tasks.remove(name),
            TaskLocator::Scoped { scope, task } => {
                self.scopes.get_mut(scope)?.tasks_mut().remove(task)
            }
        }
    }
}

fn store(map: &mut TaskMap, definition: TaskDefinition) {
    let replacement = definition.id();
    if let Some(previous) = map.insert(definition.name().to_owned(), definition) {
        tracing::debug!(
            task = %previous.locator(),
            previous = %previous.id(),
            replacement = %replacement,
            "overrode task definition"
        );
    }
}

fn validate_name(kind: &'static str, name: &str) -> Result<(), DslError> {
    if name.is_empty() {
        return Err(DslError::EmptyName { kind });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// A declared task, borrowed together with the registry that owns it.
///
/// Dereferences to the stored [`TaskDefinition`]. Relocation goes back through
/// the registry via [`TaskHandle::set_scope`].
pub struct TaskHandle<'a> {
    dsl: &'a mut TasksDsl,
    locator: TaskLocator,
}

impl<'a> TaskHandle<'a> {
    pub fn locator(&self) -> &TaskLocator {
        &self.locator
    }

    /// Move this task into `scope`. See [`TasksDsl::move_task`].
    pub fn set_scope(
        self,
        scope: &str,
        description: Option<&str>,
    ) -> Result<TaskHandle<'a>, DslError> {
        let locator = self.dsl.move_task(&self.locator, scope, description)?;
        Ok(TaskHandle {
            dsl: self.dsl,
            locator,
        })
    }

    pub fn set_description(&mut self, description: &str) -> &mut Self {
        self.definition_mut().set_description(description);
        self
    }

    pub fn set_action(&mut self, action: ActionFn) -> &mut Self {
        self.definition_mut().set_action(action);
        self
    }

    fn definition_mut(&mut self) -> &mut TaskDefinition {
        self.dsl
            .definition_mut(&self.locator)
            .expect("task handle points at a registered definition")
    }
}

impl Deref for TaskHandle<'_> {
    type Target = TaskDefinition;

    fn deref(&self) -> &TaskDefinition {
        // The handle holds the only borrow of the registry, so the slot
        // cannot have been vacated since the handle was created.
        self.dsl
            .definition(&self.locator)
            .expect("task handle points at a registered definition")
    }
}

/// A scope, borrowed together with the registry, for declaring tasks into it.
pub struct ScopeHandle<'a> {
    dsl: &'a mut TasksDsl,
    name: String,
}

impl ScopeHandle<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.dsl
            .scopes
            .get(&self.name)
            .and_then(ScopeDefinition::description)
    }

    pub fn task(
        &mut self,
        name: &str,
        description: Option<&str>,
        action: Option<ActionFn>,
    ) -> Result<TaskHandle<'_>, DslError> {
        let locator = TaskLocator::scoped(self.name.clone(), name);
        self.dsl.declare_task(locator, description, action, false)
    }

    pub fn subtask(
        &mut self,
        name: &str,
        description: Option<&str>,
        action: Option<ActionFn>,
    ) -> Result<TaskHandle<'_>, DslError> {
        let locator = TaskLocator::scoped(self.name.clone(), name);
        self.dsl.declare_task(locator, description, action, true)
    }

    /// Alias of [`ScopeHandle::subtask`].
    pub fn internal_task(
        &mut self,
        name: &str,
        description: Option<&str>,
        action: Option<ActionFn>,
    ) -> Result<TaskHandle<'_>, DslError> {
        self.subtask(name, description, action)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_names_are_rejected() {
        let mut dsl = TasksDsl::new();
        let err = dsl.task("", None, None).err().expect("empty task name");
        assert_eq!(err, DslError::EmptyName { kind: "task" });

        let err = dsl.task(("", "compile"), None, None).err().expect("empty scope");
        assert_eq!(err, DslError::EmptyName { kind: "scope" });

        let err = dsl.scope("", None).err().expect("empty scope");
        assert_eq!(err, DslError::EmptyName { kind: "scope" });
        assert!(dsl.task_definitions().is_empty());
        assert!(dsl.scope_definitions().is_empty());
    }

    #[test]
    fn take_keeps_empty_scope() {
        let mut dsl = TasksDsl::new();
        dsl.task(("solidity", "compile"), None, None).expect("declare");
        let taken = dsl.take(&TaskLocator::scoped("solidity", "compile"));
        assert!(taken.is_some());
        let scope = dsl.scope_definitions().get("solidity").expect("scope kept");
        assert!(scope.tasks().is_empty());
    }

    #[test]
    fn move_missing_task_is_not_found() {
        let mut dsl = TasksDsl::new();
        let err = dsl
            .move_task(&TaskLocator::flat("ghost"), "hello", None)
            .unwrap_err();
        assert!(matches!(err, DslError::TaskNotFound { .. }));
        assert!(dsl.scope_definitions().is_empty(), "no scope created on failure");
    }

    #[test]
    fn flat_task_may_move_into_scope_of_its_own_name() {
        let mut dsl = TasksDsl::new();
        let handle = dsl.task("compile", None, None).expect("declare");
        let moved = handle.set_scope("compile", None).expect("move");
        assert_eq!(moved.scope(), Some("compile"));
        assert!(dsl.task_definitions().is_empty());
        assert!(dsl.scope_definitions()["compile"].task("compile").is_some());
    }
}
