use crate::output::{OutputMode, pretty_kv, pretty_section, render};
use anyhow::{Context as _, Result};
use clap::Args;
use quire_core::config::{self, ProjectConfig, QUIRE_DIR};
use quire_core::db::{self, migrations};
use serde::Serialize;
use std::path::Path;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite the default config even if `.quire/` already exists.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct InitReport {
    config: String,
    store: String,
    schema_version: u32,
}

/// Execute `quire init`. Creates the project skeleton:
///
/// ```text
/// .quire/
///   config.toml      (default project config)
///   quire.sqlite3    (migrated store, unless [store] path points elsewhere)
/// ```
///
/// An existing store is migrated in place, never truncated.
///
/// # Errors
///
/// Returns an error if `.quire/` already exists and `--force` is not set,
/// or if any filesystem or store operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let quire_dir = project_root.join(QUIRE_DIR);
    if quire_dir.exists() && !args.force {
        anyhow::bail!(".quire/ already exists. Use `quire init --force` to reinitialize.");
    }

    std::fs::create_dir_all(&quire_dir)
        .with_context(|| format!("Failed to create {}", quire_dir.display()))?;

    let config_path = config::project_config_path(project_root);
    std::fs::write(&config_path, config::default_project_toml()?)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let project = ProjectConfig::default();
    let store_path = project.store.resolve_path(project_root);
    let conn = db::open_store(&store_path, project.store.busy_timeout())?;
    let schema_version = migrations::current_schema_version(&conn)?;
    tracing::info!(store = %store_path.display(), schema_version, "initialized quire project");

    let report = InitReport {
        config: config_path.display().to_string(),
        store: store_path.display().to_string(),
        schema_version,
    };
    render(output, &report, |report, w| {
        if output == OutputMode::Pretty {
            pretty_section(w, "Initialized quire project")?;
        }
        pretty_kv(w, "config", &report.config)?;
        pretty_kv(w, "store", &report.store)?;
        pretty_kv(w, "schema", report.schema_version.to_string())
    })
}
