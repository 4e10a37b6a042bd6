//! URL slug type for categories.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The input string is empty.
    #[error("slug cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[a-z0-9-]`.
    #[error("slug contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A lowercase URL slug such as `female` or `all-products`.
///
/// ## Constraints
///
/// - Length: 1-64 characters
/// - Only ASCII lowercase letters, digits and `-`
///
/// Input is lowercased before validation, so `Female` parses as `female`.
///
/// ## Examples
///
/// ```
/// use dine_mart_core::Slug;
///
/// assert_eq!(Slug::parse("Female").unwrap().as_str(), "female");
/// assert!(Slug::parse("").is_err());
/// assert!(Slug::parse("../etc").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum length of a slug.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `Slug` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 64 characters,
    /// or contains anything other than ASCII letters, digits and `-`.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let lower = s.to_ascii_lowercase();
        if let Some(c) = lower
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(SlugError::InvalidCharacter(c));
        }

        Ok(Self(lower))
    }

    /// Get the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        assert_eq!(Slug::parse("kid").unwrap().as_str(), "kid");
        assert_eq!(Slug::parse("summer-2024").unwrap().as_str(), "summer-2024");
        assert_eq!(Slug::parse("MALE").unwrap().to_string(), "male");
    }

    #[test]
    fn test_empty_slug() {
        assert_eq!(Slug::parse(""), Err(SlugError::Empty));
    }

    #[test]
    fn test_too_long_slug() {
        let long = "a".repeat(Slug::MAX_LENGTH + 1);
        assert_eq!(
            Slug::parse(&long),
            Err(SlugError::TooLong {
                max: Slug::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(Slug::parse("a/b"), Err(SlugError::InvalidCharacter('/')));
        assert_eq!(Slug::parse("a b"), Err(SlugError::InvalidCharacter(' ')));
        assert!(Slug::parse("women's").is_err());
    }
}
