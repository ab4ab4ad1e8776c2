//! Configuration loading and env substitution.
//!
//! Config files: `projdesk.toml`, `projdesk.yaml`, or `projdesk.json`
//! Searched in `./` then `~/.config/projdesk/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{apply_env_overrides, config_dir, discover_and_load, load_config},
    schema::{ProjdeskConfig, ProjectsConfig},
};
