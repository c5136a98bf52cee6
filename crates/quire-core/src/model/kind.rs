use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Column holding an item's rank within its group, shared by every ordered table.
pub const ORDER_COLUMN: &str = "section_order";

/// Record kinds that carry a position within a parent-owned group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A post within a continuity, optionally inside a subcontinuity.
    Post,
    /// A subcontinuity within a continuity.
    BoardSection,
    /// A gallery attached to a character.
    CharacterGallery,
}

/// Record kinds that own an ordered group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentKind {
    Board,
    Character,
}

/// Record kinds that partition a parent's group into independent ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    BoardSection,
}

impl ItemKind {
    pub const ALL: [Self; 3] = [Self::Post, Self::BoardSection, Self::CharacterGallery];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::BoardSection => "board_section",
            Self::CharacterGallery => "character_gallery",
        }
    }

    /// Backing table name.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Post => "posts",
            Self::BoardSection => "board_sections",
            Self::CharacterGallery => "characters_galleries",
        }
    }

    #[must_use]
    pub const fn parent_kind(self) -> ParentKind {
        match self {
            Self::Post | Self::BoardSection => ParentKind::Board,
            Self::CharacterGallery => ParentKind::Character,
        }
    }

    /// Foreign-key column pointing at the parent row.
    #[must_use]
    pub const fn parent_column(self) -> &'static str {
        self.parent_kind().foreign_key()
    }

    /// `None` for kinds that are ordered across the whole parent.
    #[must_use]
    pub const fn section_kind(self) -> Option<SectionKind> {
        match self {
            Self::Post => Some(SectionKind::BoardSection),
            Self::BoardSection | Self::CharacterGallery => None,
        }
    }

    #[must_use]
    pub const fn section_column(self) -> Option<&'static str> {
        match self.section_kind() {
            Some(section) => Some(section.foreign_key()),
            None => None,
        }
    }

    #[must_use]
    pub const fn is_sectioned(self) -> bool {
        self.section_kind().is_some()
    }

    /// Singular noun used in user-facing messages.
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::BoardSection => "section",
            Self::CharacterGallery => "gallery",
        }
    }

    /// Plural noun used in user-facing messages.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Post => "posts",
            Self::BoardSection => "sections",
            Self::CharacterGallery => "galleries",
        }
    }
}

impl ParentKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Character => "character",
        }
    }

    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Board => "boards",
            Self::Character => "characters",
        }
    }

    /// Column name used by children to reference this parent.
    #[must_use]
    pub const fn foreign_key(self) -> &'static str {
        match self {
            Self::Board => "board_id",
            Self::Character => "character_id",
        }
    }

    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Board => "continuity",
            Self::Character => "character",
        }
    }
}

impl SectionKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::BoardSection => "board_section",
        }
    }

    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::BoardSection => "board_sections",
        }
    }

    #[must_use]
    pub const fn foreign_key(self) -> &'static str {
        match self {
            Self::BoardSection => "section_id",
        }
    }

    /// The parent kind a section row belongs to.
    #[must_use]
    pub const fn parent_kind(self) -> ParentKind {
        match self {
            Self::BoardSection => ParentKind::Board,
        }
    }
}

/// Error returned when parsing a kind from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError {
    pub expected: &'static str,
    pub got: String,
}

impl ParseKindError {
    #[must_use]
    pub const fn code(&self) -> crate::error::ErrorCode {
        crate::error::ErrorCode::UnknownKind
    }
}

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseKindError {}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ParentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase().replace('-', "_")
}

impl FromStr for ItemKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "post" | "posts" => Ok(Self::Post),
            "board_section" | "board_sections" | "section" | "sections" | "subcontinuity" => {
                Ok(Self::BoardSection)
            }
            "character_gallery" | "character_galleries" | "gallery" | "galleries" => {
                Ok(Self::CharacterGallery)
            }
            _ => Err(ParseKindError {
                expected: "item kind",
                got: s.to_string(),
            }),
        }
    }
}
