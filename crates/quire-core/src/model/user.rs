use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::kind::ParseKindError;

/// Site-wide permission level of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Read-only account; may not edit anything, including its own records.
    Reader,
    #[default]
    Regular,
    /// May edit other users' characters.
    Mod,
    /// May edit everything.
    Admin,
}

impl Role {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Regular => "regular",
            Self::Mod => "mod",
            Self::Admin => "admin",
        }
    }

    /// Whether the role may edit continuities it does not write in.
    #[must_use]
    pub const fn edits_any_continuity(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether the role may edit characters it does not own.
    #[must_use]
    pub const fn edits_any_character(self) -> bool {
        matches!(self, Self::Admin | Self::Mod)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reader" => Ok(Self::Reader),
            "regular" => Ok(Self::Regular),
            "mod" | "moderator" => Ok(Self::Mod),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseKindError {
                expected: "role",
                got: s.to_string(),
            }),
        }
    }
}
