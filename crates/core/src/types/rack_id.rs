//! Rack identifier type.
//!
//! Racks are identified by a human-entered (or scanned) string such as
//! `R1-A`. Products reference their rack by this string, not by the rack's
//! row ID, so the value must be normalized the same way everywhere.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`RackId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RackIdError {
    /// The input is empty or only whitespace.
    #[error("rack id cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("rack id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A rack's natural key.
///
/// ## Constraints
///
/// - Surrounding whitespace is trimmed
/// - Length after trimming: 1-64 characters
///
/// ## Examples
///
/// ```
/// use rackstock_core::RackId;
///
/// assert_eq!(RackId::parse("  R1-A ").unwrap().as_str(), "R1-A");
/// assert!(RackId::parse("").is_err());
/// assert!(RackId::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RackId(String);

impl RackId {
    /// Maximum length of a rack identifier, in characters.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `RackId` from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`RackId::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, RackIdError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(RackIdError::Empty);
        }

        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(RackIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the rack identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `RackId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for RackId {
    type Err = RackIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for RackId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let id = RackId::parse("\tR2-B\n").unwrap();
        assert_eq!(id.as_str(), "R2-B");
        assert_eq!(id.to_string(), "R2-B");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(RackId::parse(""), Err(RackIdError::Empty));
        assert_eq!(RackId::parse("   "), Err(RackIdError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "R".repeat(RackId::MAX_LENGTH + 1);
        assert!(matches!(
            RackId::parse(&long),
            Err(RackIdError::TooLong { .. })
        ));
        assert!(RackId::parse(&"R".repeat(RackId::MAX_LENGTH)).is_ok());
    }

    #[test]
    fn test_case_is_preserved() {
        // Lookups are exact-match, so "r1-a" and "R1-A" are different racks.
        assert_ne!(RackId::parse("r1-a").unwrap(), RackId::parse("R1-A").unwrap());
    }
}
