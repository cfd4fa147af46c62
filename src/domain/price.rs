use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A monetary amount stored as a count of minor units (cents).
///
/// Parsing accepts at most two fractional digits and `Display` always prints
/// two, so `"11.5"`, `"11.50"`, and the serialized form all name the same
/// amount. Serde passes the raw `i64` through untouched, which keeps cache
/// payload round-trips exact.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(i64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    #[error("`{0}` is not a decimal amount")]
    Malformed(String),
    #[error("`{0}` has more than two fractional digits")]
    Precision(String),
    #[error("`{0}` does not fit the representable amount range")]
    OutOfRange(String),
}

impl Price {
    pub const fn from_minor_units(minor_units: i64) -> Self {
        Self(minor_units)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Parses a plain decimal string such as `"11"`, `"11.5"`, or `"-11.50"`.
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let trimmed = input.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(PriceError::Malformed(input.to_string()));
        }
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) {
            return Err(PriceError::Malformed(input.to_string()));
        }
        if fraction.len() > 2 {
            return Err(PriceError::Precision(input.to_string()));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| PriceError::OutOfRange(input.to_string()))?
        };
        let cents: i64 = match fraction.len() {
            0 => 0,
            len => {
                let parsed: i64 = fraction
                    .parse()
                    .map_err(|_| PriceError::Malformed(input.to_string()))?;
                if len == 1 { parsed * 10 } else { parsed }
            }
        };
        let minor = whole
            .checked_mul(100)
            .and_then(|m| m.checked_add(cents))
            .ok_or_else(|| PriceError::OutOfRange(input.to_string()))?;
        Ok(Self(if negative { -minor } else { minor }))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", magnitude / 100, magnitude % 100)
    }
}
