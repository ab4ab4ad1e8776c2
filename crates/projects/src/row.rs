//! Per-entry workflow: remove confirmation and the two-phase VPM migration.

use std::collections::{HashMap, HashSet};

use {
    projdesk_protocol::Project,
    projdesk_service_traits::{Notifier, ProjectBackend, ServiceResult},
    tokio::sync::watch,
    tracing::{debug, info, warn},
};

use crate::{
    capabilities::capabilities,
    error::{Error, Result},
    list::{ProjectListController, Snapshot},
    view::RowButtons,
};

pub const PROJECT_MIGRATED: &str = "Project migrated successfully";
const NOT_MIGRATABLE: &str = "Only legacy projects can be migrated";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowWorkflowState {
    Normal,
    RemoveConfirm,
    MigrateConfirm,
    MigrateCopying,
    MigrateUpdating,
}

impl RowWorkflowState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::RemoveConfirm => "remove:confirm",
            Self::MigrateConfirm => "migrateVpm:confirm",
            Self::MigrateCopying => "migrateVpm:copyingProject",
            Self::MigrateUpdating => "migrateVpm:updating",
        }
    }

    /// Whether a dialog is open for the row.
    pub fn is_modal(self) -> bool {
        self != Self::Normal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationMode {
    /// Copy the project first and convert the copy.
    Copy,
    InPlace,
}

/// Outcome of reconciling a row with a fresh snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSync {
    Unchanged,
    Updated,
    /// The path is no longer listed; the row should be dropped.
    Gone,
}

/// State machine for one rendered list entry.
///
/// Calls issued by one row are strictly sequential: every operation first
/// moves the machine out of the state it requires, so a second call fails
/// with [`Error::InvalidTransition`] instead of overlapping.
pub struct ProjectRowWorkflow {
    list: ProjectListController,
    project: Project,
    state: watch::Sender<RowWorkflowState>,
}

impl ProjectRowWorkflow {
    #[must_use]
    pub fn new(list: ProjectListController, project: Project) -> Self {
        let (state, _) = watch::channel(RowWorkflowState::Normal);
        Self {
            list,
            project,
            state,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn state(&self) -> RowWorkflowState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<RowWorkflowState> {
        self.state.subscribe()
    }

    pub fn buttons(&self) -> RowButtons {
        RowButtons::for_project(&self.project, self.list.is_busy())
    }

    pub fn can_request_remove(&self) -> bool {
        self.state() == RowWorkflowState::Normal && !self.list.is_busy()
    }

    pub fn can_request_migrate(&self) -> bool {
        self.can_request_remove()
            && self.project.exists
            && capabilities(self.project.project_type).can_migrate
    }

    /// "Remove the Directory" needs a directory to delete.
    pub fn can_remove_directory(&self) -> bool {
        self.project.exists
    }

    /// Atomically move from `from` to `to`.
    fn advance(
        &self,
        from: RowWorkflowState,
        to: RowWorkflowState,
        action: &'static str,
    ) -> Result<()> {
        let mut current = from;
        let moved = self.state.send_if_modified(|state| {
            current = *state;
            if *state != from {
                return false;
            }
            *state = to;
            true
        });
        if !moved {
            return Err(Error::invalid_transition(current.as_str(), action));
        }
        debug!(path = %self.project.path, from = from.as_str(), to = to.as_str(), "row transition");
        Ok(())
    }

    fn reset(&self) {
        self.state.send_replace(RowWorkflowState::Normal);
    }

    pub fn request_remove(&self) -> Result<()> {
        if self.list.is_busy() {
            return Err(Error::Busy);
        }
        self.advance(RowWorkflowState::Normal, RowWorkflowState::RemoveConfirm, "remove")
    }

    pub fn request_migrate(&self) -> Result<()> {
        if self.list.is_busy() {
            return Err(Error::Busy);
        }
        if !self.project.exists {
            return Err(Error::project_missing(&self.project.path));
        }
        let caps = capabilities(self.project.project_type);
        if !caps.can_migrate {
            return Err(Error::ActionUnavailable {
                reason: caps.disabled_reason.unwrap_or(NOT_MIGRATABLE),
            });
        }
        self.advance(RowWorkflowState::Normal, RowWorkflowState::MigrateConfirm, "migrate")
    }

    /// Close an open confirmation dialog.
    pub fn cancel(&self) -> Result<()> {
        let mut current = RowWorkflowState::Normal;
        let closed = self.state.send_if_modified(|state| {
            current = *state;
            match *state {
                RowWorkflowState::RemoveConfirm | RowWorkflowState::MigrateConfirm => {
                    *state = RowWorkflowState::Normal;
                    true
                },
                _ => false,
            }
        });
        if closed {
            Ok(())
        } else {
            Err(Error::invalid_transition(current.as_str(), "cancel"))
        }
    }

    /// Confirm removal. The dialog closes before the call is issued; the list
    /// refreshes afterwards whatever the outcome.
    pub async fn remove(&self, directory: bool) -> Result<()> {
        if directory && !self.can_remove_directory() {
            return Err(Error::project_missing(&self.project.path));
        }
        self.advance(RowWorkflowState::RemoveConfirm, RowWorkflowState::Normal, "remove")?;
        self.list.remove_entry(&self.project, directory).await
    }

    /// Confirm migration. A failure at any step leaves the original project
    /// untouched and the row back in `Normal`.
    pub async fn migrate(&self, mode: MigrationMode) -> Result<()> {
        let first = match mode {
            MigrationMode::Copy => RowWorkflowState::MigrateCopying,
            MigrationMode::InPlace => RowWorkflowState::MigrateUpdating,
        };
        self.advance(RowWorkflowState::MigrateConfirm, first, "migrate")?;

        let busy = self.list.begin_mutation();
        let outcome = self.run_migration(mode).await;
        self.reset();
        drop(busy);

        match outcome {
            Ok(target) => {
                info!(source = %self.project.path, target = %target, "project migrated");
                self.list.notifier().success(PROJECT_MIGRATED);
                if let Err(e) = self.list.reload().await {
                    debug!(error = %e, "refresh after migration failed");
                }
                Ok(())
            },
            Err(e) => {
                warn!(path = %self.project.path, error = %e, "error migrating project");
                self.list.notifier().error(&e.to_string());
                Err(e.into())
            },
        }
    }

    /// Returns the path that was converted.
    async fn run_migration(&self, mode: MigrationMode) -> ServiceResult<String> {
        let backend = self.list.backend();
        let target = match mode {
            MigrationMode::InPlace => self.project.path.clone(),
            MigrationMode::Copy => {
                let copy = backend
                    .copy_project_for_migration(&self.project.path)
                    .await?;
                self.state.send_replace(RowWorkflowState::MigrateUpdating);
                copy
            },
        };
        backend.migrate_project_to_vpm(&target).await?;
        Ok(target)
    }

    /// Best effort; failures are reported but never change the row state.
    pub async fn open_folder(&self) -> Result<()> {
        if !self.project.exists {
            return Err(Error::project_missing(&self.project.path));
        }
        self.list
            .backend()
            .open_path(&self.project.path)
            .await
            .map_err(|e| {
                warn!(path = %self.project.path, error = %e, "failed to open project folder");
                self.list.notifier().error(&e.to_string());
                Error::from(e)
            })
    }

    /// Adopt this row's entry from a new snapshot, matched by path.
    pub fn sync(&mut self, snapshot: &Snapshot) -> RowSync {
        match snapshot.find_by_path(&self.project.path) {
            None => RowSync::Gone,
            Some(project) if *project == self.project => RowSync::Unchanged,
            Some(project) => {
                self.project = project.clone();
                RowSync::Updated
            },
        }
    }
}

/// The set of mounted rows, keyed by project path.
pub struct ProjectRows {
    list: ProjectListController,
    rows: Vec<ProjectRowWorkflow>,
}

impl ProjectRows {
    #[must_use]
    pub fn new(list: ProjectListController) -> Self {
        Self {
            list,
            rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[ProjectRowWorkflow] {
        &self.rows
    }

    pub fn get(&self, path: &str) -> Option<&ProjectRowWorkflow> {
        self.rows.iter().find(|row| row.project.path == path)
    }

    /// Rebuild the row set for `snapshot`. Rows whose path survives keep their
    /// workflow state; new paths mount fresh rows; vanished paths unmount.
    pub fn sync(&mut self, snapshot: &Snapshot) {
        let mut previous: HashMap<String, ProjectRowWorkflow> = self
            .rows
            .drain(..)
            .map(|row| (row.project.path.clone(), row))
            .collect();
        let mut seen = HashSet::new();

        for project in snapshot.projects() {
            if !seen.insert(project.path.as_str()) {
                continue;
            }
            let row = match previous.remove(&project.path) {
                Some(mut row) => {
                    row.sync(snapshot);
                    row
                },
                None => self.list.row(project.clone()),
            };
            self.rows.push(row);
        }

        for path in previous.keys() {
            debug!(path = %path, "unmounting row");
        }
    }
}
