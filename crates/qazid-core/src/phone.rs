//! # Phone Number
//!
//! Validated phone number newtype for person records.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A registry phone number.
///
/// The canonical format is exactly 11 digits (country code included,
/// no `+`, separators, or spaces), e.g. `"77011234567"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phone(String);

impl Phone {
    /// Create a phone number from a string value, validating the format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPhone`] if the string is not
    /// exactly 11 ASCII digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.len() != 11 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidPhone(s));
        }
        Ok(Self(s))
    }

    /// Access the phone number string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Phone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
