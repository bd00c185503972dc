//! YAML task manifest.
//!
//! # Storage layout
//!
//! ```text
//! ~/.taskdsl/
//!   tasks.yaml   (mode 0600)
//! ```
//!
//! # API pattern
//!
//! Every path-dependent function has two forms:
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! # Example
//!
//! ```yaml
//! scopes:
//!   - name: solidity
//!     description: Solidity compilation tasks
//! tasks:
//!   - name: compile
//!     scope: solidity
//!     description: Compile contracts
//!     result: ok
//!   - name: clean
//!     subtask: true
//! relocations:
//!   - task: clean
//!     to: cache
//!     description: Cache maintenance
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::constant_action;
use crate::dsl::TasksDsl;
use crate::error::{DslError, ManifestError};
use crate::types::TaskLocator;

/// An explicitly declared scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A task declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub subtask: bool,
    /// Value the task's action resolves to. Without it the task has no action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl TaskEntry {
    pub fn locator(&self) -> TaskLocator {
        match &self.scope {
            Some(scope) => TaskLocator::scoped(scope.clone(), self.name.clone()),
            None => TaskLocator::flat(self.name.clone()),
        }
    }
}

/// Move of an already declared task into another scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelocationEntry {
    pub task: String,
    /// Current scope of the task; absent for a flat task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    /// Description for `to`, used only if that scope has none yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Root of a task manifest file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskManifest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<ScopeEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<TaskEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relocations: Vec<RelocationEntry>,
}

impl TaskManifest {
    /// Declare everything in this manifest into `dsl`: scopes, then tasks,
    /// then relocations, each in file order.
    ///
    /// Stops at the first clash; entries before it stay applied.
    pub fn apply(&self, dsl: &mut TasksDsl) -> Result<(), DslError> {
        for scope in &self.scopes {
            dsl.scope(&scope.name, scope.description.as_deref())?;
        }

        for entry in &self.tasks {
            let action = entry.result.clone().map(constant_action);
            dsl.declare_task(
                entry.locator(),
                entry.description.as_deref(),
                action,
                entry.subtask,
            )?;
        }

        for relocation in &self.relocations {
            let from = match &relocation.from {
                Some(scope) => TaskLocator::scoped(scope.clone(), relocation.task.clone()),
                None => TaskLocator::flat(relocation.task.clone()),
            };
            dsl.move_task(&from, &relocation.to, relocation.description.as_deref())?;
        }

        tracing::debug!(
            scopes = self.scopes.len(),
            tasks = self.tasks.len(),
            relocations = self.relocations.len(),
            "applied task manifest"
        );
        Ok(())
    }

    /// A fresh registry holding this manifest's declarations.
    pub fn build(&self) -> Result<TasksDsl, DslError> {
        let mut dsl = TasksDsl::new();
        self.apply(&mut dsl)?;
        Ok(dsl)
    }
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.taskdsl/tasks.yaml` — pure, no I/O.
pub fn manifest_path_at(home: &Path) -> PathBuf {
    home.join(".taskdsl").join("tasks.yaml")
}

/// `manifest_path_at` convenience wrapper.
pub fn manifest_path() -> Result<PathBuf, ManifestError> {
    Ok(manifest_path_at(&home()?))
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load a manifest from an explicit file path.
///
/// Returns `ManifestError::ManifestNotFound` if absent,
/// `ManifestError::Parse` (with path + line context) if malformed YAML.
pub fn load_manifest_from(path: &Path) -> Result<TaskManifest, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::ManifestNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| ManifestError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load `<home>/.taskdsl/tasks.yaml`.
pub fn load_manifest_at(home: &Path) -> Result<TaskManifest, ManifestError> {
    load_manifest_from(&manifest_path_at(home))
}

/// `load_manifest_at` convenience wrapper.
pub fn load_manifest() -> Result<TaskManifest, ManifestError> {
    load_manifest_at(&home()?)
}

/// Load a manifest and apply it to a fresh registry.
pub fn load_registry_from(path: &Path) -> Result<TasksDsl, ManifestError> {
    let manifest = load_manifest_from(path)?;
    Ok(manifest.build()?)
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save a manifest to `path`.
///
/// Write flow: serialize → `.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_manifest_to(path: &Path, manifest: &TaskManifest) -> Result<(), ManifestError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            set_dir_permissions(parent)?;
        }
    }
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let yaml = serde_yaml::to_string(manifest)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Save to `<home>/.taskdsl/tasks.yaml`.
pub fn save_manifest_at(home: &Path, manifest: &TaskManifest) -> Result<(), ManifestError> {
    save_manifest_to(&manifest_path_at(home), manifest)
}

/// `save_manifest_at` convenience wrapper.
pub fn save_manifest(manifest: &TaskManifest) -> Result<(), ManifestError> {
    save_manifest_at(&home()?, manifest)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ManifestError> {
    dirs::home_dir().ok_or(ManifestError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ManifestError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ManifestError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ManifestError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ManifestError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_home() -> TempDir {
        TempDir::new().expect("tempdir")
    }

    #[test]
    fn manifest_path_is_correct() {
        let home = make_home();
        let path = manifest_path_at(home.path());
        assert!(path.ends_with(".taskdsl/tasks.yaml"));
    }

    #[test]
    fn atomic_write_cleans_up_tmp() {
        let home = make_home();
        save_manifest_at(home.path(), &TaskManifest::default()).expect("save");
        let tmp = manifest_path_at(home.path()).with_file_name("tasks.yaml.tmp");
        assert!(!tmp.exists(), ".tmp must be gone after successful save");
        assert!(manifest_path_at(home.path()).exists());
    }

    #[test]
    fn load_missing_manifest_returns_not_found() {
        let home = make_home();
        let err = load_manifest_at(home.path()).unwrap_err();
        assert!(matches!(err, ManifestError::ManifestNotFound { .. }));
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let manifest: TaskManifest =
            serde_yaml::from_str("tasks:\n  - name: compile\n").expect("parse");
        assert!(manifest.scopes.is_empty());
        assert!(manifest.relocations.is_empty());
        assert_eq!(manifest.tasks[0].locator(), TaskLocator::flat("compile"));
        assert!(!manifest.tasks[0].subtask);
        assert!(manifest.tasks[0].result.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed = serde_yaml::from_str::<TaskManifest>("tasks:\n  - name: a\n    params: []\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(ManifestError::HomeNotFound.to_string().contains("home directory"));
    }
}
