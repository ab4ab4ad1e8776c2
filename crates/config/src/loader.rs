use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::ProjdeskConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "projdesk.toml",
    "projdesk.yaml",
    "projdesk.yml",
    "projdesk.json",
];

const ENV_NAME_CHECK_DEBOUNCE_MS: &str = "PROJDESK_NAME_CHECK_DEBOUNCE_MS";

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<ProjdeskConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations, then apply env
/// overrides.
///
/// Search order:
/// 1. `./projdesk.{toml,yaml,yml,json}`
/// 2. `~/.config/projdesk/projdesk.{toml,yaml,yml,json}`
///
/// Falls back to `ProjdeskConfig::default()` when nothing is found or the
/// file does not parse.
pub fn discover_and_load() -> ProjdeskConfig {
    let config = match find_config_file() {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                ProjdeskConfig::default()
            })
        },
        None => {
            debug!("no config file found, using defaults");
            ProjdeskConfig::default()
        },
    };
    apply_env_overrides(config)
}

/// Apply `PROJDESK_*` environment overrides on top of a loaded config.
pub fn apply_env_overrides(config: ProjdeskConfig) -> ProjdeskConfig {
    apply_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_overrides_with(
    mut config: ProjdeskConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ProjdeskConfig {
    if let Some(raw) = lookup(ENV_NAME_CHECK_DEBOUNCE_MS) {
        match raw.trim().parse::<u64>() {
            Ok(ms) => config.projects.name_check_debounce_ms = ms,
            Err(e) => warn!(
                var = ENV_NAME_CHECK_DEBOUNCE_MS,
                value = %raw,
                error = %e,
                "ignoring invalid override"
            ),
        }
    }
    config
}

fn find_config_file() -> Option<PathBuf> {
    let local = CONFIG_FILENAMES.iter().map(PathBuf::from);
    let global = config_dir()
        .into_iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)));
    local.chain(global).find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/projdesk/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "projdesk").map(|d| d.config_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<ProjdeskConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
