//! Config schema types.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjdeskConfig {
    pub projects: ProjectsConfig,
}

/// Project list and creation dialog settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectsConfig {
    /// Quiet period after the last edit before the project name is checked.
    pub name_check_debounce_ms: u64,
    /// Name pre-filled in the create-project dialog.
    pub default_project_name: String,
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        Self {
            name_check_debounce_ms: 500,
            default_project_name: "New Project".into(),
        }
    }
}

impl ProjectsConfig {
    pub fn name_check_debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.name_check_debounce_ms)
    }
}
