//! Derived presentation state: the filtered list and per-row button states.

use projdesk_protocol::Project;

use crate::capabilities::{
    DisplayType, PROJECT_FOLDER_MISSING, PrimaryAction, capabilities, display_type, is_legacy,
};

/// Projects whose name contains `search` (case-insensitive), most recently
/// modified first. Ties keep backend order.
pub fn visible_projects(projects: &[Project], search: &str) -> Vec<Project> {
    let needle = search.to_lowercase();
    let mut shown: Vec<Project> = projects
        .iter()
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    shown.sort_by(|a, b| {
        b.last_modified
            .cmp(&a.last_modified)
            .then(a.index.cmp(&b.index))
    });
    shown
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonState {
    pub enabled: bool,
    /// Tooltip explaining a disabled button.
    pub reason: Option<&'static str>,
}

impl ButtonState {
    fn enabled() -> Self {
        Self {
            enabled: true,
            reason: None,
        }
    }

    fn disabled(reason: Option<&'static str>) -> Self {
        Self {
            enabled: false,
            reason,
        }
    }
}

/// Everything a row needs to render its type column and buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowButtons {
    pub display_type: DisplayType,
    pub legacy: bool,
    pub primary_action: PrimaryAction,
    pub primary: ButtonState,
    pub open_folder: ButtonState,
    pub remove: ButtonState,
}

impl RowButtons {
    pub fn for_project(project: &Project, busy: bool) -> Self {
        let caps = capabilities(project.project_type);

        // A missing folder disables everything except removal, and its
        // tooltip wins over the type-specific one.
        let gate = |allowed: bool, reason: Option<&'static str>| {
            if !project.exists {
                ButtonState::disabled(Some(PROJECT_FOLDER_MISSING))
            } else if !allowed {
                ButtonState::disabled(reason)
            } else if busy {
                ButtonState::disabled(None)
            } else {
                ButtonState::enabled()
            }
        };

        Self {
            display_type: display_type(project.project_type),
            legacy: is_legacy(project.project_type),
            primary_action: caps.primary,
            primary: gate(caps.primary_enabled(), caps.disabled_reason),
            open_folder: gate(true, None),
            remove: if busy {
                ButtonState::disabled(None)
            } else {
                ButtonState::enabled()
            },
        }
    }
}
