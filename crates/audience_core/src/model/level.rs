//! Taxonomy level key.
//!
//! # Responsibility
//! - Name the four fixed depths of the audience taxonomy.
//! - Replace free-form string keys with a closed, typed lookup.
//!
//! # Invariants
//! - Level order is `Identity > Category > Subcategory > Subsub`.
//! - `Identity` has no parent level and `Subsub` has no child level.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One depth of the four-level taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Top-level root, e.g. "Entrepreneur".
    Identity,
    Category,
    Subcategory,
    /// Leaf level.
    Subsub,
}

/// Stable string value for identity level.
pub const LEVEL_IDENTITY: &str = "identity";
/// Stable string value for category level.
pub const LEVEL_CATEGORY: &str = "category";
/// Stable string value for subcategory level.
pub const LEVEL_SUBCATEGORY: &str = "subcategory";
/// Stable string value for sub-subcategory level.
pub const LEVEL_SUBSUB: &str = "subsub";

impl Level {
    /// All levels, root first.
    pub const ALL: [Level; 4] = [
        Level::Identity,
        Level::Category,
        Level::Subcategory,
        Level::Subsub,
    ];

    /// Levels that sit below an identity and can be owned by one.
    pub const OWNED: [Level; 3] = [Level::Category, Level::Subcategory, Level::Subsub];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identity => LEVEL_IDENTITY,
            Self::Category => LEVEL_CATEGORY,
            Self::Subcategory => LEVEL_SUBCATEGORY,
            Self::Subsub => LEVEL_SUBSUB,
        }
    }

    /// Level one step closer to the root.
    pub fn parent(self) -> Option<Level> {
        match self {
            Self::Identity => None,
            Self::Category => Some(Self::Identity),
            Self::Subcategory => Some(Self::Category),
            Self::Subsub => Some(Self::Subcategory),
        }
    }

    /// Level one step closer to the leaves.
    pub fn child(self) -> Option<Level> {
        match self {
            Self::Identity => Some(Self::Category),
            Self::Category => Some(Self::Subcategory),
            Self::Subcategory => Some(Self::Subsub),
            Self::Subsub => None,
        }
    }

    /// Zero-based depth; identities are depth 0.
    pub fn depth(self) -> usize {
        match self {
            Self::Identity => 0,
            Self::Category => 1,
            Self::Subcategory => 2,
            Self::Subsub => 3,
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses one level from its stable string value.
///
/// Surrounding whitespace and ASCII case are ignored.
pub fn parse_level(value: &str) -> Result<Level, LevelParseError> {
    let normalized = value.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(LevelParseError::Empty);
    }
    match normalized.as_str() {
        LEVEL_IDENTITY => Ok(Level::Identity),
        LEVEL_CATEGORY => Ok(Level::Category),
        LEVEL_SUBCATEGORY => Ok(Level::Subcategory),
        LEVEL_SUBSUB => Ok(Level::Subsub),
        other => Err(LevelParseError::Unsupported(other.to_string())),
    }
}

/// Level parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelParseError {
    Empty,
    Unsupported(String),
}

impl Display for LevelParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "taxonomy level must not be empty"),
            Self::Unsupported(value) => write!(
                f,
                "unsupported taxonomy level `{value}`; expected identity|category|subcategory|subsub"
            ),
        }
    }
}

impl Error for LevelParseError {}

#[cfg(test)]
mod tests {
    use super::{parse_level, Level, LevelParseError};

    #[test]
    fn parent_and_child_walk_the_hierarchy() {
        assert_eq!(Level::Identity.parent(), None);
        assert_eq!(Level::Subsub.child(), None);
        for level in Level::ALL {
            if let Some(child) = level.child() {
                assert_eq!(child.parent(), Some(level));
                assert_eq!(child.depth(), level.depth() + 1);
            }
        }
    }

    #[test]
    fn parses_known_levels_case_insensitively() {
        assert_eq!(parse_level(" Category ").expect("category"), Level::Category);
        assert_eq!(parse_level("SUBSUB").expect("subsub"), Level::Subsub);
        for level in Level::ALL {
            assert_eq!(parse_level(level.as_str()).expect("round trip"), level);
        }
    }

    #[test]
    fn rejects_empty_and_unknown_levels() {
        assert_eq!(parse_level("  "), Err(LevelParseError::Empty));
        assert_eq!(
            parse_level("goal"),
            Err(LevelParseError::Unsupported("goal".to_string()))
        );
    }
}
