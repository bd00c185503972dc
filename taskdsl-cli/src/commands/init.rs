//! `taskdsl init [--force]`

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::json;

use taskdsl_core::manifest::{self, RelocationEntry, ScopeEntry, TaskEntry, TaskManifest};

/// Write a starter task manifest.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing manifest.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self, manifest_path: &Path) -> Result<()> {
        if manifest_path.exists() && !self.force {
            bail!(
                "manifest already exists at '{}'; pass --force to overwrite",
                manifest_path.display()
            );
        }

        let starter = starter_manifest();
        // Refuse to write something that would not load back.
        starter.build().context("starter manifest is inconsistent")?;
        manifest::save_manifest_to(manifest_path, &starter)
            .with_context(|| format!("failed to write '{}'", manifest_path.display()))?;

        println!("✓ Wrote task manifest");
        println!("  Saved to: {}", manifest_path.display());
        Ok(())
    }
}

fn starter_manifest() -> TaskManifest {
    TaskManifest {
        scopes: vec![ScopeEntry {
            name: "build".into(),
            description: Some("Build pipeline tasks".into()),
        }],
        tasks: vec![
            TaskEntry {
                name: "compile".into(),
                scope: Some("build".into()),
                description: Some("Compile the project".into()),
                subtask: false,
                result: Some(json!("compiled")),
            },
            TaskEntry {
                name: "clean".into(),
                scope: None,
                description: Some("Remove build artifacts".into()),
                subtask: false,
                result: None,
            },
            TaskEntry {
                name: "prune".into(),
                scope: None,
                description: Some("Drop stale cache entries".into()),
                subtask: true,
                result: Some(json!({ "pruned": 0 })),
            },
        ],
        relocations: vec![RelocationEntry {
            task: "prune".into(),
            from: None,
            to: "cache".into(),
            description: Some("Cache maintenance".into()),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_manifest_builds() {
        let dsl = starter_manifest().build().expect("build");
        assert!(dsl.task_definitions().contains_key("clean"));
        assert!(dsl.scope_definitions()["cache"].task("prune").is_some());
    }
}
