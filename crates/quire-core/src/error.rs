use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    ItemNotFound,
    MultipleParents,
    SectionMismatch,
    Unauthorized,
    UnknownKind,
    TransactionFailed,
    CorruptOrdering,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::ItemNotFound => "E2001",
            Self::MultipleParents => "E2002",
            Self::SectionMismatch => "E2003",
            Self::UnknownKind => "E2004",
            Self::Unauthorized => "E4001",
            Self::TransactionFailed => "E5001",
            Self::CorruptOrdering => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Store not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::ItemNotFound => "Item not found",
            Self::MultipleParents => "Items span more than one parent",
            Self::SectionMismatch => "Items are not from the declared section",
            Self::UnknownKind => "Unknown ordered kind",
            Self::Unauthorized => "Forbidden",
            Self::TransactionFailed => "Reorder transaction failed",
            Self::CorruptOrdering => "Group positions are not contiguous",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `quire init` to create the store."),
            Self::ConfigParseError => Some("Fix syntax in .quire/config.toml and retry."),
            Self::ItemNotFound | Self::Unauthorized => None,
            Self::MultipleParents => {
                Some("Reorder one continuity (or character) at a time, or pass --parent.")
            }
            Self::SectionMismatch => {
                Some("Pass --section for the section the items belong to, or omit it for unsectioned items.")
            }
            Self::UnknownKind => Some("Use one of: post, board_section, character_gallery."),
            Self::TransactionFailed => {
                Some("No positions were changed. Retry once the store is writable.")
            }
            Self::CorruptOrdering => Some("Run `quire compact` on the affected group."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
