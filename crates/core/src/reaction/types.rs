//! Reaction types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ReactionError;

/// Kind of reaction a user can leave on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionType {
    /// Thumbs up.
    Like,
    /// Heart.
    Love,
    /// Laughing face.
    Laugh,
    /// Surprised face.
    Wow,
    /// Sad face.
    Sad,
    /// Angry face.
    Angry,
}

impl ReactionType {
    /// Every reaction type.
    pub const ALL: [Self; 6] = [
        Self::Like,
        Self::Love,
        Self::Laugh,
        Self::Wow,
        Self::Sad,
        Self::Angry,
    ];

    /// Wire name of the type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Love => "love",
            Self::Laugh => "laugh",
            Self::Wow => "wow",
            Self::Sad => "sad",
            Self::Angry => "angry",
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionType {
    type Err = ReactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ReactionError::InvalidType(s.to_string()))
    }
}

/// Reaction domain model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    /// Unique identifier.
    pub id: Uuid,
    /// Post reacted to.
    pub post_id: Uuid,
    /// Reacting user.
    pub user_id: Uuid,
    /// Reaction kind.
    pub reaction_type: ReactionType,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row data for a new reaction.
#[derive(Debug, Clone)]
pub struct NewReaction {
    /// Post reacted to.
    pub post_id: Uuid,
    /// Reacting user.
    pub user_id: Uuid,
    /// Reaction kind.
    pub reaction_type: ReactionType,
}

/// State of a post's reactions after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    /// Reactions on the post, all types and users.
    pub num_of_reactions: u64,
    /// Whether the acting user now has a reaction on the post.
    pub current_user_has_reaction: bool,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("like", ReactionType::Like)]
    #[case("love", ReactionType::Love)]
    #[case("angry", ReactionType::Angry)]
    fn test_parse(#[case] input: &str, #[case] expected: ReactionType) {
        assert_eq!(input.parse::<ReactionType>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("LIKE")]
    #[case("dislike")]
    fn test_parse_unknown(#[case] input: &str) {
        assert!(matches!(
            input.parse::<ReactionType>(),
            Err(ReactionError::InvalidType(_))
        ));
    }

    #[test]
    fn test_serde_uses_wire_names() {
        for t in ReactionType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }
}
