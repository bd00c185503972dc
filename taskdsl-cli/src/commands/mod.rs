pub mod check;
pub mod init;
pub mod list;
pub mod run;

use std::path::Path;

use anyhow::{Context, Result};
use taskdsl_core::{manifest, TasksDsl};

/// Load the manifest at `path` and declare it into a fresh registry.
pub(crate) fn load_registry(path: &Path) -> Result<TasksDsl> {
    manifest::load_registry_from(path)
        .with_context(|| format!("failed to load task manifest '{}'", path.display()))
}
