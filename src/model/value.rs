use crate::model::Reading;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The contents of one meter cell in the readings file.
///
/// The file can be edited by hand, so a cell is not guaranteed to hold a valid reading. Cells that
/// are empty or unparseable are carried through unchanged and written back exactly as read.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub enum MeterValue {
    #[default]
    Empty,
    Reading(Reading),
    Invalid(String),
}

impl MeterValue {
    /// Interprets the text of a CSV cell. This never fails.
    pub fn parse(s: &str) -> Self {
        if s.trim().is_empty() {
            return MeterValue::Empty;
        }
        match Reading::from_str(s) {
            Ok(reading) => MeterValue::Reading(reading),
            Err(_) => MeterValue::Invalid(s.to_string()),
        }
    }

    /// Returns the reading if the cell holds a valid one.
    pub fn reading(&self) -> Option<Reading> {
        match self {
            MeterValue::Reading(r) => Some(*r),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, MeterValue::Invalid(_))
    }
}

impl From<Reading> for MeterValue {
    fn from(value: Reading) -> Self {
        MeterValue::Reading(value)
    }
}

impl Display for MeterValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MeterValue::Empty => Ok(()),
            MeterValue::Reading(r) => Display::fmt(r, f),
            MeterValue::Invalid(s) => f.write_str(s),
        }
    }
}

impl Serialize for MeterValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cells() {
        assert_eq!(MeterValue::parse(""), MeterValue::Empty);
        assert_eq!(MeterValue::parse("   "), MeterValue::Empty);
        assert_eq!(
            MeterValue::parse("12.5"),
            MeterValue::Reading(Reading::from_str("12.5").unwrap())
        );
        assert_eq!(
            MeterValue::parse("n/a"),
            MeterValue::Invalid("n/a".to_string())
        );
        assert!(MeterValue::parse("-3").is_invalid());
    }

    #[test]
    fn test_display_is_verbatim() {
        for s in ["", "100.00", "oops"] {
            assert_eq!(MeterValue::parse(s).to_string(), s);
        }
    }
}
