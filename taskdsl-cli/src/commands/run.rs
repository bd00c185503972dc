//! `taskdsl run <task> [--scope <scope>] [--arg key=value]...`

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde_json::Value;

use taskdsl_core::{NoSuper, RunContext, TaskArguments, TaskLocator};

use super::load_registry;

/// Arguments for `taskdsl run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Task name.
    pub task: String,

    /// Scope the task is declared in. Omit for a flat task.
    #[arg(long, short = 's')]
    pub scope: Option<String>,

    /// Task argument as `key=value`; JSON values are parsed, anything else is
    /// passed as a string. Repeatable.
    #[arg(long = "arg", short = 'a', value_name = "KEY=VALUE", value_parser = parse_arg)]
    pub args: Vec<(String, Value)>,
}

impl RunArgs {
    pub fn run(self, manifest_path: &Path) -> Result<()> {
        let dsl = load_registry(manifest_path)?;
        let locator = match self.scope {
            Some(scope) => TaskLocator::scoped(scope, self.task),
            None => TaskLocator::flat(self.task),
        };
        let task = dsl
            .definition(&locator)
            .ok_or_else(|| anyhow!("task {locator} is not declared in the manifest"))?;

        let args: TaskArguments = self.args.into_iter().collect();
        let context = RunContext::new()
            .with("manifest", manifest_path.display().to_string())
            .with("task", task.name());
        tracing::info!(task = %locator, "running task");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .context("failed to start task runtime")?;
        let output = runtime
            .block_on(task.run(args, context, Arc::new(NoSuper)))
            .with_context(|| format!("task {locator} failed"))?;

        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("failed to serialize task result")?
        );
        Ok(())
    }
}

fn parse_arg(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("argument key is empty in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((key.to_owned(), value))
}
