use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::order::ReorderOptions;

/// Directory holding the project config and the default store.
pub const QUIRE_DIR: &str = ".quire";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub reorder: ReorderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database path, relative to the project root unless absolute.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn resolve_path(&self, project_root: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            project_root.join(&self.path)
        }
    }

    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderConfig {
    #[serde(default = "default_true")]
    pub skip_unchanged_writes: bool,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            skip_unchanged_writes: default_true(),
        }
    }
}

impl From<&ReorderConfig> for ReorderOptions {
    fn from(config: &ReorderConfig) -> Self {
        Self {
            skip_unchanged_writes: config.skip_unchanged_writes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

/// Path of the project config file under `project_root`.
#[must_use]
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(QUIRE_DIR).join("config.toml")
}

/// Load `.quire/config.toml`, falling back to defaults when it is absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_config_path(project_root);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load the per-user config from the platform config directory.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("quire/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Render the default project config, used by `quire init`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn default_project_toml() -> Result<String> {
    toml::to_string_pretty(&ProjectConfig::default()).context("serialize default config")
}

/// Merge project config, user config and the environment.
///
/// `cli_format` is the explicit `--format`/`--json` choice, if any.
///
/// # Errors
///
/// Returns an error if either config file is malformed.
pub fn resolve_config(project_root: &Path, cli_format: Option<&str>) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_format, user.output.as_deref(), env_format.as_deref());

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "plain" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

fn resolve_output(
    cli_format: Option<&str>,
    user_output: Option<&str>,
    env_format: Option<&str>,
) -> String {
    [cli_format, env_format, user_output]
        .into_iter()
        .flatten()
        .find_map(normalize_output_mode)
        .map_or_else(
            || {
                if std::io::stdout().is_terminal() {
                    "pretty".to_string()
                } else {
                    "text".to_string()
                }
            },
            str::to_string,
        )
}

const fn default_true() -> bool {
    true
}

fn default_store_path() -> PathBuf {
    PathBuf::from(QUIRE_DIR).join("quire.sqlite3")
}

const fn default_busy_timeout_ms() -> u64 {
    5_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project_with_config(content: &str) -> TempDir {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        std::fs::create_dir_all(dir.path().join(QUIRE_DIR)).expect("create .quire");
        std::fs::write(project_config_path(dir.path()), content).expect("write config");
        dir
    }

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = tempfile::tempdir().expect("temp dir must be created");
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert!(cfg.reorder.skip_unchanged_writes);
        assert_eq!(cfg.store.busy_timeout(), Duration::from_secs(5));
        assert_eq!(
            cfg.store.resolve_path(root.path()),
            root.path().join(".quire/quire.sqlite3")
        );
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let root = project_with_config(
            r"
[reorder]
skip_unchanged_writes = false
",
        );
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert!(!cfg.reorder.skip_unchanged_writes);
        assert_eq!(cfg.store.busy_timeout_ms, 5_000);

        let options = ReorderOptions::from(&cfg.reorder);
        assert!(!options.skip_unchanged_writes);
    }

    #[test]
    fn absolute_store_path_is_kept() {
        let root = project_with_config(
            r#"
[store]
path = "/var/lib/quire/forum.db"
busy_timeout_ms = 250
"#,
        );
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert_eq!(
            cfg.store.resolve_path(root.path()),
            PathBuf::from("/var/lib/quire/forum.db")
        );
        assert_eq!(cfg.store.busy_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn malformed_project_config_is_an_error() {
        let root = project_with_config("[store\npath = 3");
        let err = load_project_config(root.path()).expect_err("parse should fail");
        assert!(format!("{err:#}").contains("Failed to parse"));
    }

    #[test]
    fn default_toml_round_trips_through_loader() {
        let rendered = default_project_toml().expect("render");
        let root = project_with_config(&rendered);
        let cfg = load_project_config(root.path()).expect("load rendered default");
        assert!(cfg.reorder.skip_unchanged_writes);
    }

    #[test]
    fn cli_format_overrides_env_and_config() {
        let output = resolve_output(Some("json"), Some("pretty"), Some("text"));
        assert_eq!(output, "json");
    }

    #[test]
    fn env_beats_user_config() {
        assert_eq!(resolve_output(None, Some("json"), Some("human")), "pretty");
    }

    #[test]
    fn unknown_values_fall_through() {
        assert_eq!(resolve_output(Some("yaml"), Some("plain"), Some("xml")), "text");
    }

    #[test]
    fn user_config_parses_output() {
        let cfg: UserConfig = toml::from_str("output = \"json\"\n").expect("parse");
        assert_eq!(cfg.output.as_deref(), Some("json"));
    }
}
