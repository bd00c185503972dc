//! `taskdsl list [--json]`

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use taskdsl_core::{TaskDefinition, TaskMap, TasksDsl};

use super::load_registry;

/// Arguments for `taskdsl list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn run(self, manifest_path: &Path) -> Result<()> {
        let dsl = load_registry(manifest_path)?;
        if self.json {
            return print_json(&dsl);
        }
        print_tables(&dsl);
        Ok(())
    }
}

#[derive(Serialize)]
struct ListJson {
    tasks: Vec<TaskJson>,
    scopes: Vec<ScopeJson>,
}

#[derive(Serialize)]
struct ScopeJson {
    name: String,
    description: Option<String>,
    tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
struct TaskJson {
    name: String,
    scope: Option<String>,
    description: Option<String>,
    subtask: bool,
    action_set: bool,
}

impl From<&TaskDefinition> for TaskJson {
    fn from(task: &TaskDefinition) -> Self {
        Self {
            name: task.name().to_owned(),
            scope: task.scope().map(str::to_owned),
            description: task.description().map(str::to_owned),
            subtask: task.is_subtask(),
            action_set: task.action().is_set(),
        }
    }
}

#[derive(Tabled)]
struct TaskTableRow {
    #[tabled(rename = "task")]
    name: String,
    #[tabled(rename = "kind")]
    kind: &'static str,
    #[tabled(rename = "action")]
    action: &'static str,
    #[tabled(rename = "description")]
    description: String,
}

fn print_json(dsl: &TasksDsl) -> Result<()> {
    let payload = ListJson {
        tasks: dsl.task_definitions().values().map(TaskJson::from).collect(),
        scopes: dsl
            .scope_definitions()
            .values()
            .map(|scope| ScopeJson {
                name: scope.name().to_owned(),
                description: scope.description().map(str::to_owned),
                tasks: scope.tasks().values().map(TaskJson::from).collect(),
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize task list JSON")?
    );
    Ok(())
}

fn print_tables(dsl: &TasksDsl) {
    let tasks = dsl.task_definitions();
    let scopes = dsl.scope_definitions();
    if tasks.is_empty() && scopes.is_empty() {
        println!("No tasks declared.");
        return;
    }

    if !tasks.is_empty() {
        println!("{}", "TASKS".bold());
        println!("{}", task_table(tasks));
    }

    for scope in scopes.values() {
        match scope.description() {
            Some(description) => println!("{} — {}", scope.name().bold(), description),
            None => println!("{}", scope.name().bold()),
        }
        if scope.tasks().is_empty() {
            println!("  {}", "(no tasks)".bright_black());
            continue;
        }
        println!("{}", task_table(scope.tasks()));
    }
}

fn task_table(tasks: &TaskMap) -> Table {
    let rows: Vec<TaskTableRow> = tasks
        .values()
        .map(|task| TaskTableRow {
            name: task.name().to_owned(),
            kind: if task.is_subtask() { "subtask" } else { "task" },
            action: if task.action().is_set() { "set" } else { "unset" },
            description: task.description().unwrap_or("").to_owned(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table
}
