use crate::cmd::{GroupArgs, reorder};
use crate::output::{OutputMode, render_item};
use anyhow::Result;
use clap::Args;
use quire_core::config::ProjectConfig;
use quire_core::model::ActorId;
use quire_core::order::ReorderRequest;
use std::path::Path;

#[derive(Args, Debug)]
pub struct CompactArgs {
    #[command(flatten)]
    pub group: GroupArgs,

    /// User performing the compaction.
    #[arg(long)]
    pub actor: ActorId,
}

/// Execute `quire compact`: renumber a group `0..n` in its current order,
/// closing gaps and numbering legacy rows.
///
/// # Errors
///
/// Same as `quire reorder` with an empty id list.
pub fn run_compact(
    args: &CompactArgs,
    output: OutputMode,
    config: &ProjectConfig,
    project_root: &Path,
) -> Result<()> {
    let request = ReorderRequest::compact(args.group.kind, args.group.key());
    let listing = reorder::apply(&request, args.actor, config, project_root)?;
    render_item(&listing, output)?;
    Ok(())
}
