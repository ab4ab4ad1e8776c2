//! The create-new-project modal.

use std::sync::Arc;

use {
    projdesk_config::ProjectsConfig,
    projdesk_protocol::{PickProjectDefaultPathResult, ProjectDirCheckResult, ProjectTemplate},
    projdesk_service_traits::{Notifier, ProjectBackend, ServiceError},
    tokio::sync::watch,
    tracing::{debug, info, warn},
};

use crate::{
    debounce::{CheckFn, CheckFuture, CheckStatus, DebouncedValidator},
    error::{Error, Result},
    list::ProjectListController,
};

pub const PROJECT_CREATED: &str = "Project created successfully";
pub const INVALID_DEFAULT_PATH: &str = "Selected file is invalid as a Project Default Path";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationState {
    LoadingInitialInfo,
    EnteringInfo,
    Creating,
    /// The modal is gone; the workflow accepts no further input.
    Closed,
}

impl CreationState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoadingInitialInfo => "loading initial information",
            Self::EnteringInfo => "entering information",
            Self::Creating => "creating",
            Self::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatibilityWarning {
    Symbol,
    WideChar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCheckState {
    Checking,
    Ok,
    InvalidName,
    CompatibilityWarning(CompatibilityWarning),
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Ok,
    Warn,
    Error,
}

impl NameCheckState {
    /// `None` while checking (a spinner is shown instead).
    pub fn message(self) -> Option<&'static str> {
        match self {
            Self::Checking => None,
            Self::Ok => Some("Project name is valid"),
            Self::InvalidName => Some("Invalid Project Name"),
            Self::CompatibilityWarning(CompatibilityWarning::Symbol) => {
                Some("Using such a symbol may cause compatibility problem")
            },
            Self::CompatibilityWarning(CompatibilityWarning::WideChar) => {
                Some("Using mutlibyte characters may cause compatibility problem")
            },
            Self::AlreadyExists => Some("The folder already exists"),
        }
    }

    pub fn severity(self) -> Option<Severity> {
        match self {
            Self::Checking => None,
            Self::Ok => Some(Severity::Ok),
            Self::CompatibilityWarning(_) => Some(Severity::Warn),
            Self::InvalidName | Self::AlreadyExists => Some(Severity::Error),
        }
    }
}

impl From<ProjectDirCheckResult> for NameCheckState {
    fn from(result: ProjectDirCheckResult) -> Self {
        match result {
            ProjectDirCheckResult::Ok => Self::Ok,
            ProjectDirCheckResult::InvalidNameForFolderName => Self::InvalidName,
            ProjectDirCheckResult::MayCompatibilityProblem => {
                Self::CompatibilityWarning(CompatibilityWarning::Symbol)
            },
            ProjectDirCheckResult::WideChar => {
                Self::CompatibilityWarning(CompatibilityWarning::WideChar)
            },
            ProjectDirCheckResult::AlreadyExists => Self::AlreadyExists,
        }
    }
}

/// The pair validated together; a change to either restarts the settle delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCheckInput {
    pub location: String,
    pub name: String,
}

pub struct ProjectCreationWorkflow {
    list: ProjectListController,
    state: watch::Sender<CreationState>,
    templates: Vec<ProjectTemplate>,
    chosen_template: Option<usize>,
    name: String,
    location: String,
    name_check: DebouncedValidator<NameCheckInput, NameCheckState, ServiceError>,
}

impl ProjectCreationWorkflow {
    #[must_use]
    pub fn new(list: ProjectListController, config: &ProjectsConfig) -> Self {
        let backend = Arc::clone(list.backend());
        let check: CheckFn<NameCheckInput, NameCheckState, ServiceError> =
            Arc::new(move |input: NameCheckInput| -> CheckFuture<NameCheckState, ServiceError> {
                let backend = Arc::clone(&backend);
                Box::pin(async move {
                    backend
                        .check_project_name(&input.location, &input.name)
                        .await
                        .map(NameCheckState::from)
                })
            });
        let notifier = Arc::clone(list.notifier());
        let name_check =
            DebouncedValidator::new(config.name_check_debounce(), NameCheckState::Checking, check)
                .with_error_handler(Arc::new(move |e: ServiceError| {
                    notifier.error(&e.to_string());
                }));
        let (state, _) = watch::channel(CreationState::LoadingInitialInfo);

        Self {
            list,
            state,
            templates: Vec::new(),
            chosen_template: None,
            name: config.default_project_name.clone(),
            location: String::new(),
            name_check,
        }
    }

    pub fn state(&self) -> CreationState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<CreationState> {
        self.state.subscribe()
    }

    pub fn templates(&self) -> &[ProjectTemplate] {
        &self.templates
    }

    pub fn chosen_template(&self) -> Option<&ProjectTemplate> {
        self.chosen_template.and_then(|i| self.templates.get(i))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Where the project will be created.
    pub fn project_path_preview(&self) -> String {
        format!("{}/{}", self.location, self.name)
    }

    /// A failed check leaves the current name unvalidated, so it reads as
    /// still checking and Create stays disabled.
    pub fn name_check_state(&self) -> NameCheckState {
        match self.name_check.status() {
            CheckStatus::Checking | CheckStatus::Failed => NameCheckState::Checking,
            CheckStatus::Ready(state) => state,
        }
    }

    pub fn name_check_changes(&self) -> watch::Receiver<CheckStatus<NameCheckState>> {
        self.name_check.subscribe()
    }

    fn expect_state(&self, expected: CreationState, action: &'static str) -> Result<()> {
        let current = self.state();
        if current != expected {
            return Err(Error::invalid_transition(current.as_str(), action));
        }
        Ok(())
    }

    fn close(&self) {
        self.name_check.close();
        self.state.send_replace(CreationState::Closed);
    }

    fn revalidate(&self) {
        self.name_check.set_input(NameCheckInput {
            location: self.location.clone(),
            name: self.name.clone(),
        });
    }

    /// Fetch templates and the default location. On failure the modal
    /// closes.
    pub async fn load_defaults(&mut self) -> Result<()> {
        self.expect_state(CreationState::LoadingInitialInfo, "load defaults")?;

        match self.list.backend().creation_defaults().await {
            Ok(defaults) => {
                debug!(
                    templates = defaults.templates.len(),
                    default_path = %defaults.default_path,
                    "creation defaults loaded"
                );
                self.chosen_template = (!defaults.templates.is_empty()).then_some(0);
                self.templates = defaults.templates;
                self.location = defaults.default_path;
                self.state.send_replace(CreationState::EnteringInfo);
                self.revalidate();
                Ok(())
            },
            Err(e) => {
                warn!(error = %e, "failed to load project creation information");
                self.list.notifier().error(&e.to_string());
                self.close();
                Err(e.into())
            },
        }
    }

    /// Safe to call outside an async context; the name check runs on the
    /// runtime the workflow was built on.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.expect_state(CreationState::EnteringInfo, "edit name")?;
        self.name = name.into();
        self.revalidate();
        Ok(())
    }

    pub fn select_template(&mut self, index: usize) -> Result<()> {
        self.expect_state(CreationState::EnteringInfo, "select template")?;
        if index >= self.templates.len() {
            return Err(Error::UnknownTemplate { index });
        }
        self.chosen_template = Some(index);
        Ok(())
    }

    /// Ask the backend for a folder picker and adopt the selection.
    pub async fn select_location(&mut self) -> Result<()> {
        self.expect_state(CreationState::EnteringInfo, "select folder")?;

        match self.list.backend().pick_project_default_path().await {
            Ok(PickProjectDefaultPathResult::NoFolderSelected) => Ok(()),
            Ok(PickProjectDefaultPathResult::InvalidSelection) => {
                self.list.notifier().warning(INVALID_DEFAULT_PATH);
                Ok(())
            },
            Ok(PickProjectDefaultPathResult::Successful { new_path }) => {
                debug!(location = %new_path, "project location changed");
                self.location = new_path;
                self.revalidate();
                Ok(())
            },
            Err(e) => {
                warn!(error = %e, "failed to pick project location");
                self.list.notifier().error(&e.to_string());
                Err(e.into())
            },
        }
    }

    /// Create is offered only once the current name has settled on an
    /// acceptable result and nothing else is mutating the list.
    pub fn can_create(&self) -> bool {
        self.state() == CreationState::EnteringInfo
            && self.chosen_template.is_some()
            && !self.list.is_busy()
            && matches!(
                self.name_check_state().severity(),
                Some(Severity::Ok | Severity::Warn)
            )
    }

    /// Create the project. The modal closes whether or not the call
    /// succeeds; only success triggers a refresh.
    pub async fn create(&mut self) -> Result<()> {
        if self.list.is_busy() {
            return Err(Error::Busy);
        }
        if !self.can_create() {
            return Err(Error::NotReady);
        }
        let template = self.chosen_template().cloned().ok_or(Error::NotReady)?;

        self.state.send_replace(CreationState::Creating);
        let outcome = {
            let _busy = self.list.begin_mutation();
            debug!(location = %self.location, name = %self.name, template = %template.name, "creating project");
            self.list
                .backend()
                .create_project(&self.location, &self.name, &template)
                .await
        };
        self.close();

        match outcome {
            Ok(()) => {
                info!(path = %self.project_path_preview(), "project created");
                self.list.notifier().success(PROJECT_CREATED);
                if let Err(e) = self.list.reload().await {
                    debug!(error = %e, "refresh after create failed");
                }
                Ok(())
            },
            Err(e) => {
                warn!(error = %e, "failed to create project");
                self.list.notifier().error(&e.to_string());
                Err(e.into())
            },
        }
    }

    /// Dismiss the modal. Not possible while the project is being created.
    pub fn cancel(&mut self) -> Result<()> {
        match self.state() {
            CreationState::Creating => Err(Error::invalid_transition(
                CreationState::Creating.as_str(),
                "cancel",
            )),
            CreationState::Closed => Ok(()),
            CreationState::LoadingInitialInfo | CreationState::EnteringInfo => {
                self.close();
                Ok(())
            },
        }
    }
}
