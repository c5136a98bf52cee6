//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, compact text for scripts, or stable
//! JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. `output` in the user config
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.
//!
//! The merge itself lives in `quire_core::config::resolve_config`.

use clap::ValueEnum;
use quire_core::error::ErrorCode;
use quire_core::order::ReorderError;
use quire_core::order::project::GroupListing;
use quire_core::order::verify::{GroupReport, PositionProblem};
use serde::Serialize;
use std::io::{self, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (headings, separators).
    Pretty,
    /// Token-efficient plain rows for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Text => "text",
            Self::Json => "json",
        }
    }

    /// Map the resolved config string back to a mode.
    pub fn from_resolved(raw: &str) -> Self {
        match raw {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => Self::Text,
        }
    }

    /// Returns `true` if JSON output was requested.
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Trait implemented by any CLI result type that can be rendered in all modes.
pub trait Renderable {
    /// Render for human consumption.
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Render as a self-contained JSON value.
    fn render_json(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Render as text rows (no header; see [`Renderable::table_headers`]).
    fn render_table(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Column headers for text mode, in the same order as `render_table` fields.
    fn table_headers() -> &'static [&'static str]
    where
        Self: Sized,
    {
        &[]
    }
}

fn write_json<T: Serialize>(w: &mut dyn Write, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *w, value).map_err(io::Error::other)
}

fn group_label(listing_section: Option<quire_core::model::SectionId>) -> String {
    listing_section.map_or_else(|| "unsectioned".to_string(), |section| format!("section {section}"))
}

impl Renderable for GroupListing {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let parent = self.kind.parent_kind().noun();
        pretty_section(
            w,
            &format!(
                "{} of {parent} {} ({})",
                self.kind.plural(),
                self.key.parent_id,
                group_label(self.key.section_id)
            ),
        )?;
        if self.ids.is_empty() {
            writeln!(w, "  (empty)")?;
        }
        for (position, id) in self.ids.iter().enumerate() {
            writeln!(w, "  {position:>4}  #{id}")?;
        }
        Ok(())
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        write_json(w, self)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        for (position, id) in self.ids.iter().enumerate() {
            writeln!(w, "{position}  {id}")?;
        }
        Ok(())
    }

    fn table_headers() -> &'static [&'static str] {
        &["POS", "ID"]
    }
}

fn describe_problem(problem: &PositionProblem) -> String {
    match problem {
        PositionProblem::Unpositioned { id } => format!("#{id} has no position"),
        PositionProblem::Duplicate { position, ids } => {
            format!("position {position} held by {}", quire_core::model::ids::join_ids(ids))
        }
        PositionProblem::Gap { position } => format!("position {position} is empty"),
        PositionProblem::OutOfRange { id, position } => {
            format!("#{id} at {position} is past the end")
        }
    }
}

impl Renderable for GroupReport {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let status = if self.is_contiguous() { "ok" } else { "BROKEN" };
        writeln!(
            w,
            "{status:<6} {} {} ({}): {} member(s)",
            self.kind.parent_kind().noun(),
            self.key.parent_id,
            group_label(self.key.section_id),
            self.ids.len()
        )?;
        for problem in &self.problems {
            writeln!(w, "         - {}", describe_problem(problem))?;
        }
        Ok(())
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        write_json(w, self)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let section = self
            .key
            .section_id
            .map_or_else(|| "-".to_string(), |section| section.to_string());
        writeln!(
            w,
            "{}  {}  {section}  {}  {}",
            self.kind,
            self.key.parent_id,
            self.ids.len(),
            self.problems.len()
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["KIND", "PARENT", "SECTION", "MEMBERS", "PROBLEMS"]
    }
}

/// Render a single [`Renderable`] item to `out` using the given output mode.
pub fn render_item_to<R: Renderable>(
    item: &R,
    mode: OutputMode,
    out: &mut dyn Write,
) -> io::Result<()> {
    match mode {
        OutputMode::Pretty => item.render_human(out),
        OutputMode::Text => {
            let headers = R::table_headers();
            if !headers.is_empty() {
                writeln!(out, "{}", headers.join("  "))?;
            }
            item.render_table(out)
        }
        OutputMode::Json => {
            item.render_json(out)?;
            writeln!(out)
        }
    }
}

/// Render a single [`Renderable`] item to stdout.
pub fn render_item<R: Renderable>(item: &R, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_item_to(item, mode, &mut out)
}

/// Render a list of [`Renderable`] items to `out`.
///
/// - In JSON mode, wraps items in a JSON array.
/// - In pretty/text mode, renders items sequentially.
pub fn render_list_to<R: Renderable>(
    items: &[R],
    mode: OutputMode,
    out: &mut dyn Write,
) -> io::Result<()> {
    match mode {
        OutputMode::Pretty => {
            for item in items {
                item.render_human(out)?;
            }
        }
        OutputMode::Text => {
            let headers = if items.is_empty() {
                &[] as &[&str]
            } else {
                R::table_headers()
            };
            if !headers.is_empty() {
                writeln!(out, "{}", headers.join("  "))?;
            }
            for item in items {
                item.render_table(out)?;
            }
        }
        OutputMode::Json => {
            write!(out, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(out, ",")?;
                }
                item.render_json(out)?;
            }
            writeln!(out, "]")?;
        }
    }
    Ok(())
}

/// Render a list of [`Renderable`] items to stdout.
pub fn render_list<R: Renderable>(items: &[R], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_list_to(items, mode, &mut out)
}

/// A structured error with a stable code and optional hint.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Machine-readable error code (`E####`).
    pub code: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            hint: code.hint(),
        }
    }
}

impl From<&ReorderError> for CliError {
    fn from(err: &ReorderError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

/// Render an error to `out` in the requested format.
pub fn render_error_to(mode: OutputMode, error: &CliError, out: &mut dyn Write) -> io::Result<()> {
    match mode {
        OutputMode::Json => {
            write_json(out, &serde_json::json!({ "error": error }))?;
            writeln!(out)
        }
        OutputMode::Pretty | OutputMode::Text => {
            writeln!(out, "error[{}]: {}", error.code, error.message)?;
            if let Some(hint) = error.hint {
                writeln!(out, "  hint: {hint}")?;
            }
            Ok(())
        }
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> io::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    render_error_to(mode, error, &mut out)
}

/// Render a serializable value to stdout, with a closure for pretty/text.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => human_fn(value, &mut out)?,
    }
    Ok(())
}
