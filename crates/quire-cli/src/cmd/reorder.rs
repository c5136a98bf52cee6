use crate::cmd::open_project_store;
use crate::output::{OutputMode, render_item};
use anyhow::Result;
use clap::Args;
use quire_core::config::ProjectConfig;
use quire_core::model::{ActorId, GroupKey, ItemId, ItemKind, ParentId, SectionId};
use quire_core::order::project::{self, GroupListing};
use quire_core::order::{EditorGate, ReorderOptions, Reorderer, ReorderRequest};
use std::path::Path;

#[derive(Args, Debug)]
pub struct ReorderArgs {
    /// Kind of ordered record: post, section, or gallery.
    pub kind: ItemKind,

    /// Ids in their new order. Members left out keep their relative order
    /// after these.
    pub ids: Vec<ItemId>,

    /// Section the ids belong to; omit for unsectioned records.
    #[arg(long)]
    pub section: Option<SectionId>,

    /// Continuity or character the ids belong to. Required when no ids are given.
    #[arg(long)]
    pub parent: Option<ParentId>,

    /// User performing the reorder.
    #[arg(long)]
    pub actor: ActorId,
}

/// Apply `request` as `actor` and return the listing of the affected group.
pub fn apply(
    request: &ReorderRequest,
    actor: ActorId,
    config: &ProjectConfig,
    project_root: &Path,
) -> Result<GroupListing> {
    let mut conn = open_project_store(project_root, config)?;
    let reorderer =
        Reorderer::new(EditorGate).with_options(ReorderOptions::from(&config.reorder));

    let kind = request.kind;
    let section = request.section_id;
    let listing = reorderer.reorder_then(&mut conn, request, actor, |tx, parent| {
        Ok(project::listing(tx, kind, GroupKey::new(parent.id, section))?)
    })?;
    Ok(listing)
}

/// Execute `quire reorder`.
///
/// # Errors
///
/// Returns the store-open error, or the [`quire_core::ReorderError`] that
/// rejected the request.
pub fn run_reorder(
    args: &ReorderArgs,
    output: OutputMode,
    config: &ProjectConfig,
    project_root: &Path,
) -> Result<()> {
    let mut request = ReorderRequest::new(args.kind, args.ids.clone()).in_section(args.section);
    if let Some(parent) = args.parent {
        request = request.for_parent(parent);
    }

    let listing = apply(&request, args.actor, config, project_root)?;
    render_item(&listing, output)?;
    Ok(())
}
