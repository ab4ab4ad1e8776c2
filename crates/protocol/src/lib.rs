//! Project backend command definitions.
//!
//! All communication with the project backend goes through named commands
//! that take a JSON object of arguments and return a JSON value.
//!
//! Payload types:
//! - `Project`: one entry of the project list snapshot
//! - `ProjectTemplate`: opaque template returned by the backend
//! - `CreationDefaults`: templates and default location for new projects
//! - picker / name-check result enums

use serde::{Deserialize, Serialize};

// ── Commands ─────────────────────────────────────────────────────────────────

pub mod commands {
    pub const LIST_PROJECTS: &str = "environment_projects";
    pub const ADD_PROJECT_WITH_PICKER: &str = "environment_add_project_with_picker";
    pub const REMOVE_PROJECT: &str = "environment_remove_project";
    pub const COPY_PROJECT_FOR_MIGRATION: &str = "environment_copy_project_for_migration";
    pub const MIGRATE_PROJECT_TO_VPM: &str = "project_migrate_project_to_vpm";
    pub const CREATION_DEFAULTS: &str = "environment_project_creation_information";
    pub const CHECK_PROJECT_NAME: &str = "environment_check_project_name";
    pub const CREATE_PROJECT: &str = "environment_create_project";
    pub const PICK_PROJECT_DEFAULT_PATH: &str = "environment_pick_project_default_path";
    pub const OPEN_PATH: &str = "util_open";
}

// ── Projects ─────────────────────────────────────────────────────────────────

/// Project format as detected by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectType {
    LegacySdk2,
    LegacyWorlds,
    LegacyAvatars,
    UpmWorlds,
    UpmAvatars,
    UpmStarter,
    Worlds,
    Avatars,
    VpmStarter,
    #[serde(other)]
    Unknown,
}

/// One entry of the project list.
///
/// `(list_version, index)` addresses the entry in backend commands and is only
/// valid for the list the entry was fetched with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub list_version: u64,
    pub index: usize,
    pub name: String,
    pub path: String,
    pub project_type: ProjectType,
    #[serde(rename = "unity")]
    pub unity_version: String,
    /// Milliseconds since the Unix epoch.
    pub last_modified: i64,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    #[serde(rename = "is_exists")]
    pub exists: bool,
}

/// Template offered when creating a project. Passed back to the backend
/// unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTemplate {
    pub r#type: String,
    pub name: String,
}

/// Defaults for the create-project dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationDefaults {
    pub templates: Vec<ProjectTemplate>,
    pub default_path: String,
}

// ── Command results ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddProjectWithPickerResult {
    NoFolderSelected,
    #[serde(alias = "InvalidFolderAsAProject")]
    InvalidSelection,
    Successful,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PickProjectDefaultPathResult {
    NoFolderSelected,
    InvalidSelection,
    Successful { new_path: String },
}

/// Verdict of the backend on a prospective project directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectDirCheckResult {
    Ok,
    InvalidNameForFolderName,
    MayCompatibilityProblem,
    WideChar,
    AlreadyExists,
}
