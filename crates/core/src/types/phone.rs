//! Customer WhatsApp number.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Local trunk prefix dialled before national numbers.
const TRUNK_PREFIX: char = '0';

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty or whitespace.
    #[error("phone number cannot be empty")]
    Empty,
}

/// A customer's contact number, as typed.
///
/// Only emptiness is rejected; the number is kept as entered (trimmed) so it
/// can be shown back to the merchant verbatim. Use
/// [`PhoneNumber::whatsapp_address`] to get the canonical international form
/// used to address a chat.
///
/// ## Examples
///
/// ```
/// use crib_core::PhoneNumber;
///
/// let phone = PhoneNumber::parse(" 08012345678 ").unwrap();
/// assert_eq!(phone.as_str(), "08012345678");
/// assert_eq!(phone.whatsapp_address("234"), "2348012345678");
///
/// assert!(PhoneNumber::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse a `PhoneNumber` from user input.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError::Empty`] if the input is empty after trimming.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the number as entered (trimmed).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical international address for the messaging channel.
    ///
    /// Spaces, dashes, dots and parentheses are dropped, a leading `+` is
    /// removed, and a leading trunk `0` is replaced with `country_code`.
    #[must_use]
    pub fn whatsapp_address(&self, country_code: &str) -> String {
        let compact: String = self
            .0
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();
        let compact = compact.strip_prefix('+').unwrap_or(&compact);

        match compact.strip_prefix(TRUNK_PREFIX) {
            Some(national) => format!("{country_code}{national}"),
            None => compact.to_owned(),
        }
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
