//! The shared project list snapshot and the busy flag gating mutations.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use {
    projdesk_config::ProjectsConfig,
    projdesk_protocol::{AddProjectWithPickerResult, Project},
    projdesk_service_traits::{Notifier, ProjectBackend},
    tokio::sync::watch,
    tracing::{debug, info, warn},
};

use crate::{
    creation::ProjectCreationWorkflow,
    error::{Error, Result},
    row::ProjectRowWorkflow,
    view::visible_projects,
};

pub const PROJECT_REMOVED: &str = "Project removed successfully";
pub const PROJECT_ADDED: &str = "Project added successfully";
pub const INVALID_PROJECT_FOLDER: &str = "Invalid folder selected as a project";

/// The project list as last fetched. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    projects: Arc<[Project]>,
}

impl Snapshot {
    #[must_use]
    pub fn new(projects: Vec<Project>) -> Self {
        Self {
            projects: projects.into(),
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// First entry with `path`; later duplicates are shadowed.
    pub fn find_by_path(&self, path: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.path == path)
    }

    /// Whether `project` still addresses the same entry in this snapshot.
    pub fn contains_entry(&self, project: &Project) -> bool {
        self.projects.iter().any(|p| {
            p.list_version == project.list_version
                && p.index == project.index
                && p.path == project.path
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStatus {
    /// No fetch has completed yet.
    Pending,
    Loaded(Snapshot),
    Failed { message: String },
}

impl ListStatus {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::Loaded(snapshot) => Some(snapshot),
            Self::Pending | Self::Failed { .. } => None,
        }
    }

    /// Text shown in place of the list.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Pending => Some("Loading...".into()),
            Self::Loaded(_) => None,
            Self::Failed { message } => Some(format!("Error Loading projects: {message}")),
        }
    }
}

/// In-flight work counted towards the busy flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Activity {
    pub fetches: usize,
    pub mutations: usize,
}

impl Activity {
    pub fn is_busy(&self) -> bool {
        self.fetches > 0 || self.mutations > 0
    }
}

#[derive(Debug, Clone, Copy)]
enum ActivityKind {
    Fetch,
    Mutation,
}

/// Counts as in-flight activity until dropped.
#[must_use = "the list is only busy while the guard is alive"]
pub struct BusyGuard {
    inner: Arc<Inner>,
    kind: ActivityKind,
}

impl BusyGuard {
    fn enter(inner: &Arc<Inner>, kind: ActivityKind) -> Self {
        inner.activity.send_modify(|a| match kind {
            ActivityKind::Fetch => a.fetches += 1,
            ActivityKind::Mutation => a.mutations += 1,
        });
        Self {
            inner: Arc::clone(inner),
            kind,
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let kind = self.kind;
        self.inner.activity.send_modify(|a| match kind {
            ActivityKind::Fetch => a.fetches = a.fetches.saturating_sub(1),
            ActivityKind::Mutation => a.mutations = a.mutations.saturating_sub(1),
        });
    }
}

struct Inner {
    backend: Arc<dyn ProjectBackend>,
    notifier: Arc<dyn Notifier>,
    status: watch::Sender<ListStatus>,
    activity: watch::Sender<Activity>,
    fetch_generation: AtomicU64,
}

/// Owns the list snapshot and the busy flag. Cheap to clone; clones share
/// state.
#[derive(Clone)]
pub struct ProjectListController {
    inner: Arc<Inner>,
}

impl ProjectListController {
    #[must_use]
    pub fn new(backend: Arc<dyn ProjectBackend>, notifier: Arc<dyn Notifier>) -> Self {
        let (status, _) = watch::channel(ListStatus::Pending);
        let (activity, _) = watch::channel(Activity::default());
        Self {
            inner: Arc::new(Inner {
                backend,
                notifier,
                status,
                activity,
                fetch_generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn status(&self) -> ListStatus {
        self.inner.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListStatus> {
        self.inner.status.subscribe()
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.inner.status.borrow().snapshot().cloned()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.activity.borrow().is_busy()
    }

    pub fn activity(&self) -> watch::Receiver<Activity> {
        self.inner.activity.subscribe()
    }

    /// The refresh button is available only while nothing is in flight.
    pub fn can_refresh(&self) -> bool {
        !self.is_busy()
    }

    /// Re-fetch the whole list. Refused while a remove, add, migrate or
    /// create is in flight; those refresh on their own once done.
    pub async fn refresh(&self) -> Result<()> {
        if self.inner.activity.borrow().mutations > 0 {
            debug!("refresh refused while a mutation is in flight");
            return Err(Error::Busy);
        }
        self.reload().await
    }

    /// Fetch without the busy check. When fetches overlap, only the most
    /// recently issued one may replace the snapshot.
    pub(crate) async fn reload(&self) -> Result<()> {
        let generation = self.inner.fetch_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _fetching = BusyGuard::enter(&self.inner, ActivityKind::Fetch);
        debug!(generation, "fetching project list");

        let result = self.inner.backend.list_projects().await;
        let next = match &result {
            Ok(projects) => ListStatus::Loaded(Snapshot::new(projects.clone())),
            Err(e) => {
                warn!(generation, error = %e, "failed to load projects");
                ListStatus::Failed {
                    message: e.to_string(),
                }
            },
        };

        let applied = self.inner.status.send_if_modified(|status| {
            if self.inner.fetch_generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *status = next;
            true
        });
        if applied {
            debug!(generation, "project list replaced");
        } else {
            debug!(generation, "discarding superseded project list");
        }

        result.map(drop).map_err(Error::from)
    }

    /// Remove `project` from the list, optionally deleting its directory,
    /// then refresh whatever the outcome.
    pub async fn remove_entry(&self, project: &Project, directory: bool) -> Result<()> {
        if !self
            .snapshot()
            .is_some_and(|snapshot| snapshot.contains_entry(project))
        {
            let err = Error::StaleEntry {
                list_version: project.list_version,
                index: project.index,
            };
            warn!(path = %project.path, error = %err, "refusing to remove stale entry");
            self.inner.notifier.error(&err.to_string());
            return Err(err);
        }

        let outcome = {
            let _busy = self.begin_mutation();
            debug!(
                list_version = project.list_version,
                index = project.index,
                directory,
                "removing project"
            );
            self.inner
                .backend
                .remove_project(project.list_version, project.index, directory)
                .await
        };

        match &outcome {
            Ok(()) => {
                info!(path = %project.path, directory, "project removed");
                self.inner.notifier.success(PROJECT_REMOVED);
            },
            Err(e) => {
                warn!(path = %project.path, error = %e, "failed to remove project");
                self.inner.notifier.error(&e.to_string());
            },
        }

        if let Err(e) = self.reload().await {
            debug!(error = %e, "refresh after remove failed");
        }
        outcome.map_err(Error::from)
    }

    /// Let the user pick an existing project folder and add it to the list.
    pub async fn add_existing_project(&self) -> Result<AddProjectWithPickerResult> {
        if self.is_busy() {
            return Err(Error::Busy);
        }

        let result = {
            let _busy = self.begin_mutation();
            self.inner.backend.add_project_with_picker().await
        };

        match result {
            Ok(AddProjectWithPickerResult::NoFolderSelected) => {
                Ok(AddProjectWithPickerResult::NoFolderSelected)
            },
            Ok(AddProjectWithPickerResult::InvalidSelection) => {
                self.inner.notifier.error(INVALID_PROJECT_FOLDER);
                Ok(AddProjectWithPickerResult::InvalidSelection)
            },
            Ok(AddProjectWithPickerResult::Successful) => {
                info!("project added");
                self.inner.notifier.success(PROJECT_ADDED);
                if let Err(e) = self.reload().await {
                    debug!(error = %e, "refresh after add failed");
                }
                Ok(AddProjectWithPickerResult::Successful)
            },
            Err(e) => {
                warn!(error = %e, "failed to add project");
                self.inner.notifier.error(&e.to_string());
                Err(e.into())
            },
        }
    }

    /// Current snapshot filtered by `search` and sorted for display.
    pub fn visible_projects(&self, search: &str) -> Vec<Project> {
        self.snapshot()
            .map(|snapshot| visible_projects(snapshot.projects(), search))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn row(&self, project: Project) -> ProjectRowWorkflow {
        ProjectRowWorkflow::new(self.clone(), project)
    }

    /// Open the creation modal. Refused while the list is busy.
    pub fn start_creation(&self, config: &ProjectsConfig) -> Result<ProjectCreationWorkflow> {
        if self.is_busy() {
            return Err(Error::Busy);
        }
        Ok(ProjectCreationWorkflow::new(self.clone(), config))
    }

    pub(crate) fn backend(&self) -> &Arc<dyn ProjectBackend> {
        &self.inner.backend
    }

    pub(crate) fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.inner.notifier
    }

    pub(crate) fn begin_mutation(&self) -> BusyGuard {
        BusyGuard::enter(&self.inner, ActivityKind::Mutation)
    }
}
