//! Stock-keeping unit identifier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Sku`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum SkuError {
    /// The input is not exactly [`Sku::LENGTH`] characters.
    #[error("sku must be exactly {expected} characters (got {got})")]
    WrongLength {
        /// Required length.
        expected: usize,
        /// Actual length.
        got: usize,
    },
    /// The input contains a character outside `A-Z0-9`.
    #[error("sku may only contain uppercase letters and digits")]
    InvalidCharacter,
}

/// A short, human-legible product key.
///
/// Assigned exactly once when a product is created and globally unique.
/// Always 8 characters: a 4-character uppercase prefix derived from the
/// product name followed by a 4-digit numeric suffix.
///
/// ```
/// use catalog_core::Sku;
///
/// assert!(Sku::parse("MOUS1234").is_ok());
/// assert!(Sku::parse("short").is_err());
/// assert!(Sku::parse("mous1234").is_err()); // lowercase
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Fixed total length of a SKU.
    pub const LENGTH: usize = 8;

    /// Parse a `Sku` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 8 uppercase
    /// alphanumeric characters.
    pub fn parse(s: &str) -> Result<Self, SkuError> {
        if s.len() != Self::LENGTH {
            return Err(SkuError::WrongLength {
                expected: Self::LENGTH,
                got: s.len(),
            });
        }

        if !s.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()) {
            return Err(SkuError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the SKU as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Sku` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Sku::parse("MOUS1234").is_ok());
        assert!(Sku::parse("XXXX0000").is_ok());
        assert!(Sku::parse("A1B2C3D4").is_ok());
    }

    #[test]
    fn test_parse_wrong_length() {
        assert!(matches!(
            Sku::parse("MOUSE12345"),
            Err(SkuError::WrongLength { got: 10, .. })
        ));
        assert!(matches!(Sku::parse(""), Err(SkuError::WrongLength { .. })));
    }

    #[test]
    fn test_parse_invalid_characters() {
        assert!(matches!(
            Sku::parse("mous1234"),
            Err(SkuError::InvalidCharacter)
        ));
        assert!(matches!(
            Sku::parse("MOU-1234"),
            Err(SkuError::InvalidCharacter)
        ));
    }
}
