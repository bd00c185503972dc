//! `taskdsl check`

use std::path::Path;

use anyhow::Result;
use clap::Args;

use super::load_registry;

/// Validate the manifest against the namespace rules.
#[derive(Args, Debug)]
pub struct CheckArgs {}

impl CheckArgs {
    pub fn run(self, manifest_path: &Path) -> Result<()> {
        let dsl = load_registry(manifest_path)?;
        let scopes = dsl.scope_definitions();
        let scoped_tasks: usize = scopes.values().map(|s| s.tasks().len()).sum();

        println!(
            "✓ {}: {} flat task(s), {} scope(s), {} scoped task(s)",
            manifest_path.display(),
            dsl.task_definitions().len(),
            scopes.len(),
            scoped_tasks,
        );
        Ok(())
    }
}
