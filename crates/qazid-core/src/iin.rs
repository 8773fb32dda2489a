//! # IIN Validation
//!
//! Decoder and checker for the Kazakhstan individual identification number
//! (IIN): a 12-digit string encoding birth date, century, and sex, closed by
//! a weighted check digit.
//!
//! ## Layout
//!
//! ```text
//! Y Y M M D D C S S S S K
//! 0 1 2 3 4 5 6 7 8 9 10 11
//! ```
//!
//! Positions 0-5 are the two-digit year, month, and day of birth. Position 6
//! is the century/sex indicator: `{1,2}` → 1800s, `{3,4}` → 1900s, `{5,6}` →
//! 2000s, odd → male, even → female. Positions 7-10 are a serial. Position
//! 11 is the check digit.
//!
//! ## Checksum
//!
//! The control value is the weighted digit sum of positions 0-10 modulo 11,
//! first with weights `1..=11`. When that yields 10, a second pass runs with
//! the weights rotated left by two. A control of 10 after the second pass is
//! indeterminate and the IIN is invalid — such numbers are never issued.
//!
//! ## Check Order
//!
//! Rules are checked in a fixed order (length, character set, indicator,
//! date, checksum) and the first violation is reported. Validation is a pure
//! function: no I/O, no shared state, identical results on repeated calls.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::IinError;

/// Number of digits in an IIN.
const IIN_LEN: usize = 12;

/// First-pass checksum weights for digit positions 0-10.
const WEIGHTS_FIRST: [u32; 11] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

/// Second-pass weights, used only when the first pass yields a control of 10.
const WEIGHTS_SECOND: [u32; 11] = [3, 4, 5, 6, 7, 8, 9, 10, 11, 1, 2];

/// Sex encoded by the parity of the century/sex indicator digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    /// Odd indicator digit (1, 3, 5).
    Male,
    /// Even indicator digit (2, 4, 6).
    Female,
}

impl Sex {
    /// Return the string representation of this sex.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Birth metadata decoded from a valid IIN.
///
/// Constructed only by [`validate`] — holding an `IinInfo` means the source
/// string passed every structural, calendar, and checksum rule, and the
/// fields are internally consistent with its digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IinInfo {
    /// Sex from the indicator digit's parity.
    pub sex: Sex,
    /// Full date of birth after applying the century indicator.
    pub date_of_birth: NaiveDate,
}

/// Validate an IIN string and decode its birth metadata.
///
/// This is a pure function from the input string to either a decoded
/// [`IinInfo`] or the first violated rule as an [`IinError`]. It is
/// re-entrant and safe to call with unbounded concurrency.
///
/// # Errors
///
/// - [`IinError::InvalidLength`] — not exactly 12 characters
/// - [`IinError::InvalidFormat`] — a non-digit character
/// - [`IinError::InvalidCenturyCode`] — 7th digit outside `[1, 6]`
/// - [`IinError::InvalidDateOfBirth`] — the encoded date does not exist
/// - [`IinError::InvalidChecksum`] — check digit mismatch, or an
///   indeterminate checksum (control 10 after both weight passes)
pub fn validate(iin: &str) -> Result<IinInfo, IinError> {
    if iin.len() != IIN_LEN {
        return Err(IinError::InvalidLength { actual: iin.len() });
    }

    let mut digits = [0u8; IIN_LEN];
    for (position, byte) in iin.bytes().enumerate() {
        if !byte.is_ascii_digit() {
            return Err(IinError::InvalidFormat { position });
        }
        digits[position] = byte - b'0';
    }

    let year_fragment = u32::from(digits[0]) * 10 + u32::from(digits[1]);
    let month = u32::from(digits[2]) * 10 + u32::from(digits[3]);
    let day = u32::from(digits[4]) * 10 + u32::from(digits[5]);

    let indicator = digits[6];
    let century_base = match indicator {
        1 | 2 => 1800,
        3 | 4 => 1900,
        5 | 6 => 2000,
        digit => return Err(IinError::InvalidCenturyCode { digit }),
    };

    let sex = if indicator % 2 == 1 {
        Sex::Male
    } else {
        Sex::Female
    };

    let year = century_base + year_fragment as i32;

    // from_ymd_opt rejects exactly the dates that don't exist on the
    // calendar (day 31 in a 30-day month, Feb 29 outside leap years,
    // month 0/13, day 0), which is the roundtrip check the encoding needs.
    let date_of_birth = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(IinError::InvalidDateOfBirth { year, month, day })?;
    debug_assert_eq!(date_of_birth.month(), month);
    debug_assert_eq!(date_of_birth.day(), day);

    match control_digit(&digits) {
        Some(control) if control == digits[11] => Ok(IinInfo { sex, date_of_birth }),
        _ => Err(IinError::InvalidChecksum),
    }
}

/// Compute the expected check digit over positions 0-10.
///
/// Returns `None` when the checksum is indeterminate: both weight passes
/// yield a control of 10. Registries never issue such numbers, so an
/// indeterminate control always means the IIN is invalid.
fn control_digit(digits: &[u8; IIN_LEN]) -> Option<u8> {
    let weighted_sum = |weights: &[u32; 11]| -> u32 {
        digits[..11]
            .iter()
            .zip(weights)
            .map(|(digit, weight)| u32::from(*digit) * weight)
            .sum()
    };

    let mut control = weighted_sum(&WEIGHTS_FIRST) % 11;
    if control == 10 {
        control = weighted_sum(&WEIGHTS_SECOND) % 11;
        if control == 10 {
            return None;
        }
    }
    Some(control as u8)
}

/// A validated IIN.
///
/// The canonical storage format is the 12-digit string. Construction runs
/// the full validation, so an `Iin` value is always structurally valid,
/// checksum-correct, and decodes to a real calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Iin(String);

impl Iin {
    /// Create an IIN from a string value, running the full validation.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule as an [`IinError`].
    pub fn new(value: impl Into<String>) -> Result<Self, IinError> {
        let s = value.into();
        validate(&s)?;
        Ok(Self(s))
    }

    /// Access the IIN in canonical 12-digit form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the birth metadata carried by this IIN.
    pub fn info(&self) -> IinInfo {
        validate(&self.0).expect("validated at construction")
    }
}

impl std::fmt::Display for Iin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
