//! Scripted backend and recording notifier shared by the workflow tests.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use {
    async_trait::async_trait,
    projdesk_protocol::{
        AddProjectWithPickerResult, CreationDefaults, PickProjectDefaultPathResult, Project,
        ProjectDirCheckResult, ProjectTemplate, ProjectType, commands,
    },
    projdesk_service_traits::{
        NotificationLevel, Notifier, ProjectBackend, ServiceError, ServiceResult,
    },
};

use crate::list::ProjectListController;

pub fn project(list_version: u64, index: usize, name: &str, path: &str) -> Project {
    Project {
        list_version,
        index,
        name: name.into(),
        path: path.into(),
        project_type: ProjectType::Avatars,
        unity_version: "2022.3.6f1".into(),
        last_modified: 0,
        created_at: 0,
        exists: true,
    }
}

pub fn template(name: &str) -> ProjectTemplate {
    ProjectTemplate {
        r#type: "Builtin".into(),
        name: name.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListProjects,
    AddProjectWithPicker,
    RemoveProject {
        list_version: u64,
        index: usize,
        directory: bool,
    },
    CopyProjectForMigration(String),
    MigrateProjectToVpm(String),
    CreationDefaults,
    CheckProjectName {
        base_path: String,
        project_name: String,
    },
    CreateProject {
        base_path: String,
        project_name: String,
        template: ProjectTemplate,
    },
    PickProjectDefaultPath,
    OpenPath(String),
}

/// In-memory backend. Every call is recorded; commands named in `failing`
/// reject, commands with a latency sleep first (use a paused clock).
pub struct ScriptedBackend {
    calls: Mutex<Vec<Call>>,
    projects: Mutex<Vec<Project>>,
    list_responses: Mutex<VecDeque<(Duration, ServiceResult<Vec<Project>>)>>,
    failing: Mutex<HashSet<&'static str>>,
    latency: Mutex<HashMap<&'static str, Duration>>,
    name_results: Mutex<HashMap<String, ProjectDirCheckResult>>,
    name_latency: Mutex<HashMap<String, Duration>>,
    location_results: Mutex<HashMap<String, ProjectDirCheckResult>>,
    location_latency: Mutex<HashMap<String, Duration>>,
    add_result: Mutex<AddProjectWithPickerResult>,
    pick_result: Mutex<PickProjectDefaultPathResult>,
    defaults: Mutex<CreationDefaults>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            projects: Mutex::new(Vec::new()),
            list_responses: Mutex::new(VecDeque::new()),
            failing: Mutex::new(HashSet::new()),
            latency: Mutex::new(HashMap::new()),
            name_results: Mutex::new(HashMap::new()),
            name_latency: Mutex::new(HashMap::new()),
            location_results: Mutex::new(HashMap::new()),
            location_latency: Mutex::new(HashMap::new()),
            add_result: Mutex::new(AddProjectWithPickerResult::NoFolderSelected),
            pick_result: Mutex::new(PickProjectDefaultPathResult::NoFolderSelected),
            defaults: Mutex::new(CreationDefaults {
                templates: vec![template("Avatars"), template("Worlds")],
                default_path: "/home/user/projects".into(),
            }),
        }
    }
}

#[allow(clippy::unwrap_used)]
impl ScriptedBackend {
    pub fn with_projects(projects: Vec<Project>) -> Arc<Self> {
        let backend = Self::default();
        *backend.projects.lock().unwrap() = projects;
        Arc::new(backend)
    }

    pub fn set_projects(&self, projects: Vec<Project>) {
        *self.projects.lock().unwrap() = projects;
    }

    /// Queue one list response, served before falling back to the current
    /// project set.
    pub fn push_list_response(&self, delay: Duration, response: ServiceResult<Vec<Project>>) {
        self.list_responses
            .lock()
            .unwrap()
            .push_back((delay, response));
    }

    pub fn fail(&self, command: &'static str) {
        self.failing.lock().unwrap().insert(command);
    }

    pub fn delay(&self, command: &'static str, latency: Duration) {
        self.latency.lock().unwrap().insert(command, latency);
    }

    pub fn name_result(&self, name: &str, result: ProjectDirCheckResult) {
        self.name_results
            .lock()
            .unwrap()
            .insert(name.into(), result);
    }

    pub fn name_latency(&self, name: &str, latency: Duration) {
        self.name_latency
            .lock()
            .unwrap()
            .insert(name.into(), latency);
    }

    /// Answer for every name checked under `base_path`. Takes precedence
    /// over per-name answers.
    pub fn location_result(&self, base_path: &str, result: ProjectDirCheckResult) {
        self.location_results
            .lock()
            .unwrap()
            .insert(base_path.into(), result);
    }

    pub fn location_latency(&self, base_path: &str, latency: Duration) {
        self.location_latency
            .lock()
            .unwrap()
            .insert(base_path.into(), latency);
    }

    pub fn set_add_result(&self, result: AddProjectWithPickerResult) {
        *self.add_result.lock().unwrap() = result;
    }

    pub fn set_pick_result(&self, result: PickProjectDefaultPathResult) {
        *self.pick_result.lock().unwrap() = result;
    }

    pub fn set_defaults(&self, defaults: CreationDefaults) {
        *self.defaults.lock().unwrap() = defaults;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    pub fn list_calls(&self) -> usize {
        self.count(|c| *c == Call::ListProjects)
    }

    async fn enter(&self, command: &'static str, call: Call) -> ServiceResult {
        self.calls.lock().unwrap().push(call);
        let latency = self.latency.lock().unwrap().get(command).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.lock().unwrap().contains(command) {
            return Err(ServiceError::message(format!("{command} failed")));
        }
        Ok(())
    }
}

#[allow(clippy::unwrap_used)]
#[async_trait]
impl ProjectBackend for ScriptedBackend {
    async fn list_projects(&self) -> ServiceResult<Vec<Project>> {
        self.calls.lock().unwrap().push(Call::ListProjects);
        let queued = self.list_responses.lock().unwrap().pop_front();
        if let Some((delay, response)) = queued {
            tokio::time::sleep(delay).await;
            return response;
        }
        if self.failing.lock().unwrap().contains(commands::LIST_PROJECTS) {
            return Err("could not read project list".into());
        }
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn add_project_with_picker(&self) -> ServiceResult<AddProjectWithPickerResult> {
        self.enter(commands::ADD_PROJECT_WITH_PICKER, Call::AddProjectWithPicker).await?;
        Ok(*self.add_result.lock().unwrap())
    }

    async fn remove_project(
        &self,
        list_version: u64,
        index: usize,
        directory: bool,
    ) -> ServiceResult {
        self.enter(commands::REMOVE_PROJECT, Call::RemoveProject {
            list_version,
            index,
            directory,
        })
        .await
    }

    async fn copy_project_for_migration(&self, source_path: &str) -> ServiceResult<String> {
        self.enter(
            commands::COPY_PROJECT_FOR_MIGRATION,
            Call::CopyProjectForMigration(source_path.into()),
        )
        .await?;
        Ok(format!("{source_path}-Migrated"))
    }

    async fn migrate_project_to_vpm(&self, project_path: &str) -> ServiceResult {
        self.enter(
            commands::MIGRATE_PROJECT_TO_VPM,
            Call::MigrateProjectToVpm(project_path.into()),
        )
        .await
    }

    async fn creation_defaults(&self) -> ServiceResult<CreationDefaults> {
        self.enter(commands::CREATION_DEFAULTS, Call::CreationDefaults).await?;
        Ok(self.defaults.lock().unwrap().clone())
    }

    async fn check_project_name(
        &self,
        base_path: &str,
        project_name: &str,
    ) -> ServiceResult<ProjectDirCheckResult> {
        self.enter(commands::CHECK_PROJECT_NAME, Call::CheckProjectName {
            base_path: base_path.into(),
            project_name: project_name.into(),
        })
        .await?;
        let latency = self
            .location_latency
            .lock()
            .unwrap()
            .get(base_path)
            .copied()
            .or_else(|| self.name_latency.lock().unwrap().get(project_name).copied());
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let by_location = self.location_results.lock().unwrap().get(base_path).copied();
        Ok(by_location
            .or_else(|| self.name_results.lock().unwrap().get(project_name).copied())
            .unwrap_or(ProjectDirCheckResult::Ok))
    }

    async fn create_project(
        &self,
        base_path: &str,
        project_name: &str,
        template: &ProjectTemplate,
    ) -> ServiceResult {
        self.enter(commands::CREATE_PROJECT, Call::CreateProject {
            base_path: base_path.into(),
            project_name: project_name.into(),
            template: template.clone(),
        })
        .await
    }

    async fn pick_project_default_path(&self) -> ServiceResult<PickProjectDefaultPathResult> {
        self.enter(commands::PICK_PROJECT_DEFAULT_PATH, Call::PickProjectDefaultPath).await?;
        Ok(self.pick_result.lock().unwrap().clone())
    }

    async fn open_path(&self, path: &str) -> ServiceResult {
        self.enter(commands::OPEN_PATH, Call::OpenPath(path.into())).await
    }
}

#[derive(Default)]
pub struct RecordingNotifier(Mutex<Vec<(NotificationLevel, String)>>);

#[allow(clippy::unwrap_used)]
impl RecordingNotifier {
    pub fn all(&self) -> Vec<(NotificationLevel, String)> {
        self.0.lock().unwrap().clone()
    }

    pub fn at(&self, level: NotificationLevel) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

#[allow(clippy::unwrap_used)]
impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        self.0.lock().unwrap().push((level, message.to_owned()));
    }
}

/// Controller over a scripted backend, with the initial list already loaded.
#[allow(clippy::unwrap_used)]
pub async fn loaded(
    projects: Vec<Project>,
) -> (
    ProjectListController,
    Arc<ScriptedBackend>,
    Arc<RecordingNotifier>,
) {
    let backend = ScriptedBackend::with_projects(projects);
    let notifier = Arc::new(RecordingNotifier::default());
    let list = ProjectListController::new(backend.clone(), notifier.clone());
    list.refresh().await.unwrap();
    (list, backend, notifier)
}
