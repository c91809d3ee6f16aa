//! Digit-string contact details collected at checkout.
//!
//! Shoppers type phone and account numbers with whatever formatting they like
//! (`(555) 123-4567`, `1234 5678 90`). Both types strip every non-digit
//! character and then check the remaining digit count.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a digit string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DigitsError {
    /// The input string is empty or blank.
    #[error("value cannot be empty")]
    Empty,
    /// The input does not have an allowed number of digits.
    #[error("must have {min}-{max} digits (got {actual})")]
    InvalidLength {
        /// Minimum number of digits.
        min: usize,
        /// Maximum number of digits.
        max: usize,
        /// Digits found after stripping formatting.
        actual: usize,
    },
}

fn parse_digits(s: &str, min: usize, max: usize) -> Result<String, DigitsError> {
    if s.trim().is_empty() {
        return Err(DigitsError::Empty);
    }

    let digits: String = s.chars().filter(char::is_ascii_digit).collect();
    if !(min..=max).contains(&digits.len()) {
        return Err(DigitsError::InvalidLength {
            min,
            max,
            actual: digits.len(),
        });
    }

    Ok(digits)
}

/// A phone number normalized to its digits.
///
/// ## Examples
///
/// ```
/// use fakestore_core::PhoneNumber;
///
/// let phone = PhoneNumber::parse("(555) 123-4567").unwrap();
/// assert_eq!(phone.as_str(), "5551234567");
/// assert!(PhoneNumber::parse("123").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 10;
    /// Maximum number of digits.
    pub const MAX_DIGITS: usize = 15;

    /// Parse a phone number, ignoring formatting characters.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is blank or does not contain 10-15 digits.
    pub fn parse(s: &str) -> Result<Self, DigitsError> {
        parse_digits(s, Self::MIN_DIGITS, Self::MAX_DIGITS).map(Self)
    }

    /// Returns the digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bank account number normalized to its digits.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct AccountNumber(String);

impl AccountNumber {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 10;
    /// Maximum number of digits.
    pub const MAX_DIGITS: usize = 20;

    /// Parse an account number, ignoring formatting characters.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is blank or does not contain 10-20 digits.
    pub fn parse(s: &str) -> Result<Self, DigitsError> {
        parse_digits(s, Self::MIN_DIGITS, Self::MAX_DIGITS).map(Self)
    }

    /// Returns the digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last four digits, for receipts.
    #[must_use]
    pub fn last_four(&self) -> &str {
        let start = self.0.len().saturating_sub(4);
        self.0.get(start..).unwrap_or_default()
    }
}

// Account numbers never show up in full in logs.
impl fmt::Debug for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountNumber(****{})", self.last_four())
    }
}
