use crate::cmd::{GroupArgs, open_project_store};
use crate::output::{OutputMode, render_item};
use anyhow::Result;
use clap::Args;
use quire_core::config::ProjectConfig;
use quire_core::order::project;
use std::path::Path;

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub group: GroupArgs,
}

/// Execute `quire list`: print one group in position order.
pub fn run_list(
    args: &ListArgs,
    output: OutputMode,
    config: &ProjectConfig,
    project_root: &Path,
) -> Result<()> {
    let conn = open_project_store(project_root, config)?;
    let listing = project::listing(&conn, args.group.kind, args.group.key())?;
    render_item(&listing, output)?;
    Ok(())
}
