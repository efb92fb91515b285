//! Room identifiers.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Longest accepted room id.
pub const MAX_ROOM_ID_LEN: usize = 64;

/// Upper bound (inclusive) of generated numeric room ids.
pub const MAX_GENERATED_ROOM: u32 = 100_000;

/// Identifier of a relay room.
///
/// Non-empty, at most 64 characters from `[A-Za-z0-9_-]`, so it can be placed
/// in a query string without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

/// Why a string is not a valid room id.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum RoomIdError {
    /// Nothing after trimming.
    #[display("room id is empty")]
    Empty,
    /// More than [`MAX_ROOM_ID_LEN`] characters.
    #[display("room id is {len} characters long (max 64)")]
    TooLong {
        /// Actual length.
        len: usize,
    },
    /// A character outside `[A-Za-z0-9_-]`.
    #[display("room id contains invalid character {ch:?}")]
    InvalidChar {
        /// The offending character.
        ch: char,
    },
}

impl RoomId {
    /// Numeric room id as produced by "create room".
    pub fn from_number(number: u32) -> Self {
        Self(number.to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomId {
    type Err = RoomIdError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RoomIdError::Empty);
        }
        let len = text.chars().count();
        if len > MAX_ROOM_ID_LEN {
            return Err(RoomIdError::TooLong { len });
        }
        if let Some(ch) = text
            .chars()
            .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_'))
        {
            return Err(RoomIdError::InvalidChar { ch });
        }
        Ok(Self(text.to_string()))
    }
}

impl TryFrom<String> for RoomId {
    type Error = RoomIdError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_numeric_and_slug_ids() {
        assert_eq!("4821".parse::<RoomId>().unwrap().as_str(), "4821");
        assert_eq!(" lobby_2-b ".parse::<RoomId>().unwrap().as_str(), "lobby_2-b");
        assert_eq!(RoomId::from_number(MAX_GENERATED_ROOM).as_str(), "100000");
    }

    #[test]
    fn test_rejects_bad_ids() {
        assert_eq!("  ".parse::<RoomId>(), Err(RoomIdError::Empty));
        assert_eq!(
            "a b".parse::<RoomId>(),
            Err(RoomIdError::InvalidChar { ch: ' ' })
        );
        assert_eq!("x&y=1".parse::<RoomId>(), Err(RoomIdError::InvalidChar { ch: '&' }));
        let long = "r".repeat(MAX_ROOM_ID_LEN + 1);
        assert_eq!(
            long.parse::<RoomId>(),
            Err(RoomIdError::TooLong {
                len: MAX_ROOM_ID_LEN + 1
            })
        );
    }
}
