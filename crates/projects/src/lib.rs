//! Project list orchestration for projdesk.
//!
//! [`ProjectListController`] owns the list snapshot fetched from the backend
//! and the busy flag that keeps mutations from racing each other. Each list
//! entry is driven by a [`ProjectRowWorkflow`] (remove and VPM migration),
//! and the create-project modal by a [`ProjectCreationWorkflow`], whose name
//! check runs through a [`DebouncedValidator`].

pub mod capabilities;
pub mod creation;
pub mod debounce;
pub mod error;
pub mod format;
pub mod list;
pub mod row;
pub mod view;

#[cfg(test)]
mod test_support;

pub use {
    capabilities::{DisplayType, PrimaryAction, RowCapabilities, capabilities},
    creation::{CreationState, NameCheckState, ProjectCreationWorkflow, Severity},
    debounce::{CheckStatus, DebouncedValidator},
    error::{Error, Result},
    list::{ListStatus, ProjectListController, Snapshot},
    row::{MigrationMode, ProjectRowWorkflow, ProjectRows, RowSync, RowWorkflowState},
    view::{RowButtons, visible_projects},
};
