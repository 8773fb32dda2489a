//! # Error Types
//!
//! Structured error types for the QazID domain layer, built with `thiserror`.
//!
//! [`IinError`] is the validator's failure taxonomy. The variants are
//! mutually exclusive: validation checks rules in a fixed order and reports
//! the first violation, so a caller always sees exactly one reason.

use thiserror::Error;

/// Why an IIN failed validation.
///
/// Checks run in declaration order — length, then character set, then the
/// century/sex indicator, then the encoded calendar date, then the weighted
/// checksum. The first violated rule determines the variant.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IinError {
    /// The input is not exactly 12 characters long.
    #[error("IIN must be exactly 12 digits, got {actual} characters")]
    InvalidLength {
        /// Length of the rejected input, in bytes.
        actual: usize,
    },

    /// The input contains a character that is not an ASCII digit.
    #[error("IIN must contain only digits (non-digit at position {position})")]
    InvalidFormat {
        /// Zero-based position of the first non-digit character.
        position: usize,
    },

    /// The 7th digit is outside the defined range `[1, 6]`.
    #[error("invalid century/sex indicator {digit} (expected a digit in 1-6)")]
    InvalidCenturyCode {
        /// The rejected indicator digit.
        digit: u8,
    },

    /// The encoded year/month/day does not name a real calendar date.
    #[error("IIN encodes a non-existent date of birth: {year:04}-{month:02}-{day:02}")]
    InvalidDateOfBirth {
        /// Full year after applying the century indicator.
        year: i32,
        /// Month as encoded in positions 2-3.
        month: u32,
        /// Day as encoded in positions 4-5.
        day: u32,
    },

    /// The check digit does not match the weighted checksum, or the
    /// checksum is indeterminate (control remains 10 after both passes).
    #[error("IIN check digit does not match the weighted checksum")]
    InvalidChecksum,
}

/// Validation errors for domain primitives other than the IIN itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The IIN failed structural or checksum validation.
    #[error("invalid IIN: {0}")]
    Iin(#[from] IinError),

    /// Phone number does not match the registry format.
    #[error("invalid phone number: \"{0}\" (expected exactly 11 digits)")]
    InvalidPhone(String),
}
