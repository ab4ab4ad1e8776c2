use projdesk_service_traits::ServiceError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("another project operation is in progress")]
    Busy,
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
    #[error("{reason}")]
    ActionUnavailable { reason: &'static str },
    #[error("project folder does not exist: {path}")]
    ProjectMissing { path: String },
    #[error("project entry ({list_version}, {index}) is not in the current project list")]
    StaleEntry { list_version: u64, index: usize },
    #[error("project cannot be created yet")]
    NotReady,
    #[error("no template at index {index}")]
    UnknownTemplate { index: usize },
}

impl Error {
    #[must_use]
    pub fn invalid_transition(state: &'static str, action: &'static str) -> Self {
        Self::InvalidTransition { state, action }
    }

    #[must_use]
    pub fn project_missing(path: impl Into<String>) -> Self {
        Self::ProjectMissing { path: path.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
