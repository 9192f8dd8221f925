//! Pantry item name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`ItemName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemNameError {
    /// The input is empty or whitespace.
    #[error("item name cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("item name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A normalized pantry item name.
///
/// Names are trimmed and lowercased on the way in so that "  Rice " and
/// "rice" are stored identically. Duplicate names are allowed.
///
/// ## Examples
///
/// ```
/// use pantry_core::ItemName;
///
/// assert_eq!(ItemName::parse("  Brown Rice ").unwrap().as_str(), "brown rice");
/// assert!(ItemName::parse("").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ItemName(String);

impl ItemName {
    /// Maximum length of a normalized item name.
    pub const MAX_LENGTH: usize = 100;

    /// Parse and normalize an `ItemName`.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`ItemName::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, ItemNameError> {
        let normalized = s.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ItemNameError::Empty);
        }
        if normalized.chars().count() > Self::MAX_LENGTH {
            return Err(ItemNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(normalized))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ItemName` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ItemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
