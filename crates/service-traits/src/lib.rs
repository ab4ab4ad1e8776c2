//! Service trait interfaces for the project backend and notification surface.
//!
//! Each trait has a `Noop` implementation so the project workflows can run
//! standalone before a real backend is wired in.

mod command;

pub use command::{CommandBackend, CommandInvoker};

use {
    async_trait::async_trait,
    projdesk_protocol::{
        AddProjectWithPickerResult, CreationDefaults, PickProjectDefaultPathResult, Project,
        ProjectDirCheckResult, ProjectTemplate,
    },
    tracing::{error, info, warn},
};

/// Error type returned by service methods.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{message}")]
    Message { message: String },
    #[error("project entry ({list_version}, {index}) refers to an outdated project list")]
    StaleEntry { list_version: u64, index: usize },
    #[error("{0}")]
    Serde(#[from] serde_json::Error),
}

impl ServiceError {
    #[must_use]
    pub fn message(message: impl std::fmt::Display) -> Self {
        Self::Message {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn stale_entry(list_version: u64, index: usize) -> Self {
        Self::StaleEntry {
            list_version,
            index,
        }
    }
}

impl From<String> for ServiceError {
    fn from(value: String) -> Self {
        Self::message(value)
    }
}

impl From<&str> for ServiceError {
    fn from(value: &str) -> Self {
        Self::message(value)
    }
}

pub type ServiceResult<T = ()> = Result<T, ServiceError>;

// ── Project backend ─────────────────────────────────────────────────────────

/// Remote project-management backend. Every method is one backend command.
#[async_trait]
pub trait ProjectBackend: Send + Sync {
    async fn list_projects(&self) -> ServiceResult<Vec<Project>>;
    async fn add_project_with_picker(&self) -> ServiceResult<AddProjectWithPickerResult>;
    /// Fails with [`ServiceError::StaleEntry`] when `list_version` is not the
    /// backend's current list version.
    async fn remove_project(
        &self,
        list_version: u64,
        index: usize,
        directory: bool,
    ) -> ServiceResult;
    /// Returns the path of the copy.
    async fn copy_project_for_migration(&self, source_path: &str) -> ServiceResult<String>;
    async fn migrate_project_to_vpm(&self, project_path: &str) -> ServiceResult;
    async fn creation_defaults(&self) -> ServiceResult<CreationDefaults>;
    async fn check_project_name(
        &self,
        base_path: &str,
        project_name: &str,
    ) -> ServiceResult<ProjectDirCheckResult>;
    async fn create_project(
        &self,
        base_path: &str,
        project_name: &str,
        template: &ProjectTemplate,
    ) -> ServiceResult;
    async fn pick_project_default_path(&self) -> ServiceResult<PickProjectDefaultPathResult>;
    async fn open_path(&self, path: &str) -> ServiceResult;
}

pub struct NoopProjectBackend;

#[async_trait]
impl ProjectBackend for NoopProjectBackend {
    async fn list_projects(&self) -> ServiceResult<Vec<Project>> {
        Ok(Vec::new())
    }

    async fn add_project_with_picker(&self) -> ServiceResult<AddProjectWithPickerResult> {
        Ok(AddProjectWithPickerResult::NoFolderSelected)
    }

    async fn remove_project(&self, _v: u64, _i: usize, _d: bool) -> ServiceResult {
        Err("project backend not configured".into())
    }

    async fn copy_project_for_migration(&self, _p: &str) -> ServiceResult<String> {
        Err("project backend not configured".into())
    }

    async fn migrate_project_to_vpm(&self, _p: &str) -> ServiceResult {
        Err("project backend not configured".into())
    }

    async fn creation_defaults(&self) -> ServiceResult<CreationDefaults> {
        Ok(CreationDefaults {
            templates: Vec::new(),
            default_path: String::new(),
        })
    }

    async fn check_project_name(&self, _b: &str, _n: &str) -> ServiceResult<ProjectDirCheckResult> {
        Ok(ProjectDirCheckResult::Ok)
    }

    async fn create_project(&self, _b: &str, _n: &str, _t: &ProjectTemplate) -> ServiceResult {
        Err("project backend not configured".into())
    }

    async fn pick_project_default_path(&self) -> ServiceResult<PickProjectDefaultPathResult> {
        Ok(PickProjectDefaultPathResult::NoFolderSelected)
    }

    async fn open_path(&self, _p: &str) -> ServiceResult {
        Err("project backend not configured".into())
    }
}

// ── Notifications ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

/// User-facing notification surface (toasts).
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotificationLevel, message: &str);

    fn success(&self, message: &str) {
        self.notify(NotificationLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.notify(NotificationLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.notify(NotificationLevel::Error, message);
    }
}

/// Writes notifications to the log instead of displaying them.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Success => info!(text = message, "notification"),
            NotificationLevel::Warning => warn!(text = message, "notification"),
            NotificationLevel::Error => error!(text = message, "notification"),
        }
    }
}
