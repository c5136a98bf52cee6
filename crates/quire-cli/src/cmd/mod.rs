pub mod check;
pub mod compact;
pub mod init;
pub mod list;
pub mod reorder;

use anyhow::Result;
use clap::Args;
use quire_core::config::ProjectConfig;
use quire_core::db;
use quire_core::model::{GroupKey, ItemKind, ParentId, SectionId};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// The store file configured for this project does not exist yet.
#[derive(Debug, thiserror::Error)]
#[error("no quire store at {}", .0.display())]
pub struct NotInitialized(pub PathBuf);

/// Selects one ordered group.
#[derive(Args, Debug, Clone)]
pub struct GroupArgs {
    /// Kind of ordered record: post, section, or gallery.
    pub kind: ItemKind,

    /// Owning continuity (board) or character id.
    #[arg(long)]
    pub parent: ParentId,

    /// Section within the continuity; omit for unsectioned records.
    #[arg(long)]
    pub section: Option<SectionId>,
}

impl GroupArgs {
    pub const fn key(&self) -> GroupKey {
        GroupKey::new(self.parent, self.section)
    }
}

/// Open the project's store, failing with [`NotInitialized`] when it is missing.
pub fn open_project_store(project_root: &Path, config: &ProjectConfig) -> Result<Connection> {
    let path = config.store.resolve_path(project_root);
    db::try_open_store(&path, config.store.busy_timeout())?
        .ok_or_else(|| NotInitialized(path).into())
}
