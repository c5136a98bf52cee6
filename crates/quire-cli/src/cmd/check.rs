use crate::cmd::open_project_store;
use crate::output::{OutputMode, render_list};
use anyhow::Result;
use clap::Args;
use quire_core::config::ProjectConfig;
use quire_core::model::ItemKind;
use quire_core::order::verify::{self, GroupReport};
use std::path::Path;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Kind to check; checks every kind when omitted.
    pub kind: Option<ItemKind>,

    /// Only print groups with problems.
    #[arg(long)]
    pub broken: bool,
}

/// Some groups hold gaps, duplicates or unnumbered rows.
#[derive(Debug, thiserror::Error)]
#[error("{0} group(s) are not contiguous")]
pub struct BrokenGroups(pub usize);

/// Execute `quire check`.
///
/// # Errors
///
/// Returns [`BrokenGroups`] after printing the report when any group fails.
pub fn run_check(
    args: &CheckArgs,
    output: OutputMode,
    config: &ProjectConfig,
    project_root: &Path,
) -> Result<()> {
    let conn = open_project_store(project_root, config)?;
    let kinds = args.kind.map_or_else(|| ItemKind::ALL.to_vec(), |kind| vec![kind]);

    let mut reports: Vec<GroupReport> = Vec::new();
    for kind in kinds {
        reports.extend(verify::verify_all(&conn, kind)?);
    }

    let broken = reports.iter().filter(|report| !report.is_contiguous()).count();
    tracing::debug!(groups = reports.len(), broken, "checked group positions");

    if args.broken {
        reports.retain(|report| !report.is_contiguous());
    }
    render_list(&reports, output)?;

    if broken > 0 {
        return Err(BrokenGroups(broken).into());
    }
    Ok(())
}
