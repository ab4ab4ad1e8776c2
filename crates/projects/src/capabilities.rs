//! Per-row action availability, derived from the project type alone.

use projdesk_protocol::ProjectType;

pub const SDK2_MIGRATION_UNSUPPORTED: &str =
    "Legacy SDK2 project cannot be migrated automatically. Please migrate to SDK3 first.";
pub const UPM_UNSUPPORTED: &str = "UPM-VCC projects are not supported";
pub const PROJECT_FOLDER_MISSING: &str = "Project Folder does not exists";

/// Category shown in the type column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayType {
    Avatars,
    Worlds,
    Unknown,
}

impl DisplayType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Avatars => "Avatars",
            Self::Worlds => "Worlds",
            Self::Unknown => "Unknown",
        }
    }
}

/// The one primary action a row offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Migrate,
    Manage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCapabilities {
    pub primary: PrimaryAction,
    pub can_migrate: bool,
    pub can_manage: bool,
    /// Why the primary action is shown disabled.
    pub disabled_reason: Option<&'static str>,
}

impl RowCapabilities {
    pub fn primary_enabled(&self) -> bool {
        match self.primary {
            PrimaryAction::Migrate => self.can_migrate,
            PrimaryAction::Manage => self.can_manage,
        }
    }
}

pub fn capabilities(project_type: ProjectType) -> RowCapabilities {
    use ProjectType::*;

    match project_type {
        LegacySdk2 => RowCapabilities {
            primary: PrimaryAction::Migrate,
            can_migrate: false,
            can_manage: false,
            disabled_reason: Some(SDK2_MIGRATION_UNSUPPORTED),
        },
        LegacyWorlds | LegacyAvatars => RowCapabilities {
            primary: PrimaryAction::Migrate,
            can_migrate: true,
            can_manage: false,
            disabled_reason: None,
        },
        UpmWorlds | UpmAvatars | UpmStarter => RowCapabilities {
            primary: PrimaryAction::Manage,
            can_migrate: false,
            can_manage: false,
            disabled_reason: Some(UPM_UNSUPPORTED),
        },
        Unknown | Worlds | Avatars | VpmStarter => RowCapabilities {
            primary: PrimaryAction::Manage,
            can_migrate: false,
            can_manage: true,
            disabled_reason: None,
        },
    }
}

pub fn display_type(project_type: ProjectType) -> DisplayType {
    use ProjectType::*;

    match project_type {
        LegacyWorlds | UpmWorlds | Worlds => DisplayType::Worlds,
        LegacyAvatars | UpmAvatars | Avatars => DisplayType::Avatars,
        LegacySdk2 | UpmStarter | VpmStarter | Unknown => DisplayType::Unknown,
    }
}

/// Formats that predate the package-manager-native layout.
pub fn is_legacy(project_type: ProjectType) -> bool {
    use ProjectType::*;

    matches!(
        project_type,
        LegacySdk2 | LegacyWorlds | LegacyAvatars | UpmWorlds | UpmAvatars | UpmStarter
    )
}
