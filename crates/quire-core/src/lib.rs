//! quire-core library.
//!
//! Keeps ordered forum records (posts within a continuity, sections within a
//! continuity, galleries on a character) contiguously numbered when a caller
//! supplies a new order for part of a group.
//!
//! # Conventions
//!
//! - **Errors**: Typed [`ReorderError`] inside the ordering core; `anyhow::Result`
//!   for config loading and store setup.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod order;

pub use order::{Reorderer, ReorderError, ReorderOptions, ReorderRequest};
