//! Reading type for handling the value shown on a meter's register.
//!
//! This module provides the `Reading` type which wraps `Decimal` and rejects values that a meter
//! cannot display, i.e. anything negative.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents a single non-negative value read from a meter's register.
///
/// The text is kept exactly as entered, so `"100.50"` is written back as `"100.50"` and not
/// `"100.5"`.
///
/// # Examples
///
/// ```
/// # use meter_logger::model::Reading;
/// # use std::str::FromStr;
/// let reading = Reading::from_str("131.00").unwrap();
/// assert_eq!(reading.to_string(), "131.00");
/// assert!(Reading::from_str("-1").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Reading(Decimal);

impl Reading {
    /// Creates a new `Reading`. Returns an error if `value` is negative.
    pub fn new(value: Decimal) -> Result<Self, ReadingError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ReadingError::Negative(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

/// An error that can occur when parsing strings into `Reading` values.
pub enum ReadingError {
    /// The text is not a decimal number.
    Parse(rust_decimal::Error),
    /// The number is below zero.
    Negative(Decimal),
}

impl Debug for ReadingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ReadingError::Parse(e) => Debug::fmt(e, f),
            ReadingError::Negative(d) => write!(f, "Negative({d})"),
        }
    }
}

impl Display for ReadingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ReadingError::Parse(e) => Display::fmt(e, f),
            ReadingError::Negative(d) => write!(f, "a meter reading cannot be negative, got {d}"),
        }
    }
}

impl std::error::Error for ReadingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReadingError::Parse(e) => Some(e),
            ReadingError::Negative(_) => None,
        }
    }
}

impl FromStr for Reading {
    type Err = ReadingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(ReadingError::Parse)?;
        Reading::new(value)
    }
}

impl Display for Reading {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Serialize for Reading {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Reading {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Reading::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Reading> for Decimal {
    fn from(reading: Reading) -> Self {
        reading.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let reading = Reading::from_str("100.00").unwrap();
        assert_eq!(reading.value(), Decimal::from_str("100").unwrap());
    }

    #[test]
    fn test_parse_whitespace() {
        let reading = Reading::from_str("  50.5 ").unwrap();
        assert_eq!(reading.value(), Decimal::from_str("50.5").unwrap());
    }

    #[test]
    fn test_parse_keeps_scale() {
        assert_eq!(Reading::from_str("131.00").unwrap().to_string(), "131.00");
        assert_eq!(Reading::from_str("131").unwrap().to_string(), "131");
    }

    #[test]
    fn test_zero_is_allowed() {
        assert!(Reading::from_str("0").unwrap().value().is_zero());
        assert!(Reading::from_str("-0.00").is_ok());
    }

    #[test]
    fn test_negative_is_rejected() {
        let err = Reading::from_str("-5").unwrap_err();
        assert!(matches!(err, ReadingError::Negative(_)));
        assert!(err.to_string().contains("cannot be negative"));
    }

    #[test]
    fn test_non_numeric_is_rejected() {
        let err = Reading::from_str("abc").unwrap_err();
        assert!(matches!(err, ReadingError::Parse(_)));
        assert!(Reading::from_str("").is_err());
    }

    #[test]
    fn test_serialize() {
        let reading = Reading::from_str("55.00").unwrap();
        assert_eq!(serde_json::to_string(&reading).unwrap(), "\"55.00\"");
    }

    #[test]
    fn test_deserialize_negative() {
        let result: Result<Reading, _> = serde_json::from_str("\"-1.00\"");
        assert!(result.is_err());
    }
}
