//! Task actions and the run-super capability.
//!
//! Actions are stored at declare time and executed later by a task engine;
//! nothing in this module runs a future. Every action, including the
//! fallback for tasks declared without one, goes through [`TaskAction::invoke`].

use std::fmt;
use std::future::{self, Future};
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::ActionError;

/// Named arguments passed to a task action.
pub type TaskArguments = Map<String, Value>;

pub type ActionResult = Result<Value, ActionError>;

pub type ActionFuture = Pin<Box<dyn Future<Output = ActionResult> + Send + 'static>>;

/// A stored task action.
pub type ActionFn =
    Arc<dyn Fn(TaskArguments, RunContext, Arc<dyn RunSuper>) -> ActionFuture + Send + Sync>;

/// Wrap an async closure as an [`ActionFn`].
pub fn action_fn<F, Fut>(f: F) -> ActionFn
where
    F: Fn(TaskArguments, RunContext, Arc<dyn RunSuper>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ActionResult> + Send + 'static,
{
    Arc::new(
        move |args: TaskArguments,
              context: RunContext,
              run_super: Arc<dyn RunSuper>|
              -> ActionFuture { Box::pin(f(args, context, run_super)) },
    )
}

/// An action that always resolves to `value`.
pub fn constant_action(value: Value) -> ActionFn {
    action_fn(move |_, _, _| future::ready(Ok(value.clone())))
}

/// Environment values handed to an action by the engine running it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunContext {
    values: Map<String, Value>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

/// A previous or overridden implementation an action may delegate to.
pub trait RunSuper: Send + Sync {
    /// Whether there is anything to delegate to.
    fn is_defined(&self) -> bool;

    /// Run the delegate with `args`.
    fn call(&self, args: TaskArguments) -> ActionFuture;
}

/// Run-super capability for a task with no earlier definition.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSuper;

impl RunSuper for NoSuper {
    fn is_defined(&self) -> bool {
        false
    }

    fn call(&self, _args: TaskArguments) -> ActionFuture {
        Box::pin(future::ready(Err(ActionError::SuperNotDefined)))
    }
}

/// Run-super capability backed by a concrete action, e.g. the definition an
/// override replaced.
///
/// The delegate gets [`NoSuper`] as its own run-super unless an earlier link
/// is attached with [`SuperAction::with_super`].
#[derive(Clone)]
pub struct SuperAction {
    action: TaskAction,
    context: RunContext,
    next: Arc<dyn RunSuper>,
}

impl SuperAction {
    pub fn new(action: TaskAction, context: RunContext) -> Self {
        Self {
            action,
            context,
            next: Arc::new(NoSuper),
        }
    }

    /// Run-super handed to the delegate when it runs.
    pub fn with_super(mut self, next: Arc<dyn RunSuper>) -> Self {
        self.next = next;
        self
    }
}

impl RunSuper for SuperAction {
    fn is_defined(&self) -> bool {
        true
    }

    fn call(&self, args: TaskArguments) -> ActionFuture {
        self.action.invoke(args, self.context.clone(), Arc::clone(&self.next))
    }
}

/// The action slot of a task definition.
#[derive(Clone)]
pub enum TaskAction {
    /// Declared without an action. Invoking it delegates to `run_super` when
    /// one is defined and fails with [`ActionError::ActionNotSet`] otherwise.
    NotSet { task: String },
    Custom(ActionFn),
}

impl TaskAction {
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    pub fn invoke(
        &self,
        args: TaskArguments,
        context: RunContext,
        run_super: Arc<dyn RunSuper>,
    ) -> ActionFuture {
        match self {
            Self::Custom(action) => action(args, context, run_super),
            Self::NotSet { .. } if run_super.is_defined() => run_super.call(args),
            Self::NotSet { task } => {
                tracing::debug!(task = %task, "invoked task with no action and no super");
                let err = ActionError::ActionNotSet { task: task.clone() };
                Box::pin(future::ready(Err(err)))
            }
        }
    }
}

impl fmt::Debug for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSet { task } => f.debug_struct("NotSet").field("task", task).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn not_set_without_super_fails_with_task_name() {
        let action = TaskAction::NotSet {
            task: "compile".into(),
        };
        let err = action
            .invoke(TaskArguments::new(), RunContext::new(), Arc::new(NoSuper))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::ActionNotSet {
                task: "compile".into()
            }
        );
        assert_eq!(err.to_string(), "No action set for task compile.");
    }

    #[tokio::test]
    async fn not_set_with_super_delegates() {
        let action = TaskAction::NotSet {
            task: "compile".into(),
        };
        let previous = SuperAction::new(
            TaskAction::Custom(constant_action(json!("built-in"))),
            RunContext::new(),
        );
        let out = action
            .invoke(TaskArguments::new(), RunContext::new(), Arc::new(previous))
            .await
            .expect("delegated");
        assert_eq!(out, json!("built-in"));
    }

    #[tokio::test]
    async fn custom_action_receives_arguments_and_context() {
        let action = TaskAction::Custom(action_fn(|args, context, _| async move {
            let quiet = args.get("quiet").cloned().unwrap_or(Value::Null);
            let network = context.get("network").cloned().unwrap_or(Value::Null);
            Ok(json!({ "quiet": quiet, "network": network }))
        }));
        let mut args = TaskArguments::new();
        args.insert("quiet".into(), json!(true));
        let out = action
            .invoke(args, RunContext::new().with("network", "local"), Arc::new(NoSuper))
            .await
            .expect("run");
        assert_eq!(out, json!({ "quiet": true, "network": "local" }));
    }

    #[tokio::test]
    async fn chained_supers_reach_the_first_definition() {
        let original = SuperAction::new(
            TaskAction::Custom(constant_action(json!("original"))),
            RunContext::new(),
        );
        let middle = SuperAction::new(
            TaskAction::NotSet {
                task: "compile".into(),
            },
            RunContext::new(),
        )
        .with_super(Arc::new(original));
        let latest = TaskAction::NotSet {
            task: "compile".into(),
        };
        let out = latest
            .invoke(TaskArguments::new(), RunContext::new(), Arc::new(middle))
            .await
            .expect("delegated twice");
        assert_eq!(out, json!("original"));
    }

    #[tokio::test]
    async fn unchained_super_stops_at_not_set_delegate() {
        let middle = SuperAction::new(
            TaskAction::NotSet {
                task: "compile".into(),
            },
            RunContext::new(),
        );
        let err = middle.call(TaskArguments::new()).await.unwrap_err();
        assert_eq!(
            err,
            ActionError::ActionNotSet {
                task: "compile".into()
            }
        );
    }

    #[tokio::test]
    async fn no_super_call_fails() {
        let err = NoSuper.call(TaskArguments::new()).await.unwrap_err();
        assert_eq!(err, ActionError::SuperNotDefined);
    }

    #[test]
    fn debug_hides_closure() {
        let custom = TaskAction::Custom(constant_action(Value::Null));
        assert_eq!(format!("{custom:?}"), "Custom(..)");
    }
}
