//! [`ProjectBackend`] on top of an opaque command transport.

use {
    async_trait::async_trait,
    projdesk_protocol::{
        AddProjectWithPickerResult, CreationDefaults, PickProjectDefaultPathResult, Project,
        ProjectDirCheckResult, ProjectTemplate, commands,
    },
    serde::de::DeserializeOwned,
    serde_json::{Value, json},
    tracing::debug,
};

use crate::{ProjectBackend, ServiceResult};

/// Sends one named command with a JSON argument object and returns the raw
/// JSON result.
#[async_trait]
pub trait CommandInvoker: Send + Sync {
    async fn invoke(&self, command: &str, args: Value) -> ServiceResult<Value>;
}

/// Typed project backend that encodes each call as a backend command.
pub struct CommandBackend<I> {
    invoker: I,
}

impl<I: CommandInvoker> CommandBackend<I> {
    pub fn new(invoker: I) -> Self {
        Self { invoker }
    }

    async fn call<T: DeserializeOwned>(&self, command: &str, args: Value) -> ServiceResult<T> {
        debug!(command, "invoking backend command");
        let value = self.invoker.invoke(command, args).await?;
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl<I: CommandInvoker> ProjectBackend for CommandBackend<I> {
    async fn list_projects(&self) -> ServiceResult<Vec<Project>> {
        self.call(commands::LIST_PROJECTS, json!({})).await
    }

    async fn add_project_with_picker(&self) -> ServiceResult<AddProjectWithPickerResult> {
        self.call(commands::ADD_PROJECT_WITH_PICKER, json!({})).await
    }

    async fn remove_project(
        &self,
        list_version: u64,
        index: usize,
        directory: bool,
    ) -> ServiceResult {
        self.call(
            commands::REMOVE_PROJECT,
            json!({ "listVersion": list_version, "index": index, "directory": directory }),
        )
        .await
    }

    async fn copy_project_for_migration(&self, source_path: &str) -> ServiceResult<String> {
        self.call(
            commands::COPY_PROJECT_FOR_MIGRATION,
            json!({ "sourcePath": source_path }),
        )
        .await
    }

    async fn migrate_project_to_vpm(&self, project_path: &str) -> ServiceResult {
        self.call(
            commands::MIGRATE_PROJECT_TO_VPM,
            json!({ "projectPath": project_path }),
        )
        .await
    }

    async fn creation_defaults(&self) -> ServiceResult<CreationDefaults> {
        self.call(commands::CREATION_DEFAULTS, json!({})).await
    }

    async fn check_project_name(
        &self,
        base_path: &str,
        project_name: &str,
    ) -> ServiceResult<ProjectDirCheckResult> {
        self.call(
            commands::CHECK_PROJECT_NAME,
            json!({ "basePath": base_path, "projectName": project_name }),
        )
        .await
    }

    async fn create_project(
        &self,
        base_path: &str,
        project_name: &str,
        template: &ProjectTemplate,
    ) -> ServiceResult {
        self.call(
            commands::CREATE_PROJECT,
            json!({ "basePath": base_path, "projectName": project_name, "template": template }),
        )
        .await
    }

    async fn pick_project_default_path(&self) -> ServiceResult<PickProjectDefaultPathResult> {
        self.call(commands::PICK_PROJECT_DEFAULT_PATH, json!({})).await
    }

    async fn open_path(&self, path: &str) -> ServiceResult {
        self.call(commands::OPEN_PATH, json!({ "path": path })).await
    }
}
