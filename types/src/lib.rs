//! Core domain types for Rota.
//!
//! This crate contains pure domain types with no IO and minimal dependencies:
//! the roster entry, the immutable assignment event, validated names and
//! dates, and the rotation ranking that orders candidates fairly.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod ids;
pub mod ranking;
pub mod ui;

pub use ids::{AssignmentId, PersonId};

use std::fmt;

use thiserror::Error;

// ============================================================================
// Names
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("name must not be empty")]
pub struct EmptyNameError;

/// A roster name, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonName(String);

impl PersonName {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyNameError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(EmptyNameError);
        }
        if trimmed.len() == value.len() {
            Ok(Self(value))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<&str> for PersonName {
    type Error = EmptyNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for PersonName {
    type Error = EmptyNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::ops::Deref for PersonName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Dates
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date {input:?}: expected 8 digits in YYYYMMDD format")]
pub struct InvalidDateError {
    pub input: String,
}

/// An 8-digit `YYYYMMDD` calendar value.
///
/// Numeric order equals chronological order, so the derived `Ord` is the
/// ranking order. Only the shape is validated; `20241399` is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssignmentDate(u32);

impl AssignmentDate {
    pub const LEN: usize = 8;
    const MAX: u32 = 99_999_999;

    /// Parse user input: exactly eight ASCII digits.
    pub fn parse(input: &str) -> Result<Self, InvalidDateError> {
        let invalid = || InvalidDateError {
            input: input.to_string(),
        };
        if input.len() != Self::LEN || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        input.parse::<u32>().map(Self).map_err(|_| invalid())
    }

    /// Rebuild a date read back from storage.
    #[must_use]
    pub fn from_stored(value: i64) -> Option<Self> {
        u32::try_from(value)
            .ok()
            .filter(|v| *v <= Self::MAX)
            .map(Self)
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// The compact `YYYYMMDD` form used for entry buffers.
    #[must_use]
    pub fn stamp(self) -> String {
        format!("{:08}", self.0)
    }

    #[must_use]
    pub const fn year(self) -> u32 {
        self.0 / 10_000
    }

    #[must_use]
    pub const fn month(self) -> u32 {
        (self.0 / 100) % 100
    }

    #[must_use]
    pub const fn day(self) -> u32 {
        self.0 % 100
    }
}

impl fmt::Display for AssignmentDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl std::str::FromStr for AssignmentDate {
    type Err = InvalidDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Render an optional last-activity date, `never` when absent.
#[must_use]
pub fn describe_date(date: Option<AssignmentDate>) -> String {
    date.map_or_else(|| "never".to_string(), |d| d.to_string())
}

// ============================================================================
// Roster and history
// ============================================================================

/// A roster entry. The same entity fills the student and companion roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: PersonId,
    pub name: PersonName,
    pub hidden: bool,
}

/// An immutable pairing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub id: AssignmentId,
    pub main: PersonId,
    pub assistant: PersonId,
    pub date: AssignmentDate,
}

impl Assignment {
    /// The other participant, if `person` took part.
    #[must_use]
    pub fn partner_of(&self, person: PersonId) -> Option<PersonId> {
        if self.main == person {
            Some(self.assistant)
        } else if self.assistant == person {
            Some(self.main)
        } else {
            None
        }
    }
}

/// A person offered for the main-student slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentCandidate {
    pub person: Person,
    /// Most recent assignment in either slot.
    pub last_activity: Option<AssignmentDate>,
}

/// A person offered as companion for a fixed main student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionCandidate {
    pub person: Person,
    /// Most recent assignment together with the main student, either order.
    pub last_paired: Option<AssignmentDate>,
    /// Most recent assignment with anyone.
    pub last_activity: Option<AssignmentDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_rejects_blank() {
        assert_eq!(PersonName::new(""), Err(EmptyNameError));
        assert_eq!(PersonName::new("   \t"), Err(EmptyNameError));
    }

    #[test]
    fn name_is_trimmed() {
        let name = PersonName::new("  Ana ").unwrap();
        assert_eq!(name.as_str(), "Ana");
    }

    #[test]
    fn name_keeps_case() {
        let name = PersonName::new("ana").unwrap();
        assert_ne!(name, PersonName::new("Ana").unwrap());
    }

    #[test]
    fn date_parses_eight_digits() {
        let date = AssignmentDate::parse("20240315").unwrap();
        assert_eq!(date.value(), 20_240_315);
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 3);
        assert_eq!(date.day(), 15);
        assert_eq!(date.to_string(), "2024-03-15");
        assert_eq!(date.stamp(), "20240315");
    }

    #[test]
    fn date_rejects_wrong_length() {
        assert!(AssignmentDate::parse("2024010").is_err());
        assert!(AssignmentDate::parse("202401011").is_err());
        assert!(AssignmentDate::parse("").is_err());
    }

    #[test]
    fn date_rejects_non_digits() {
        assert!(AssignmentDate::parse("2024-1-1").is_err());
        assert!(AssignmentDate::parse("+2024010").is_err());
        assert!(AssignmentDate::parse("-2024010").is_err());
        assert!(AssignmentDate::parse("2024o101").is_err());
        assert!(AssignmentDate::parse(" 2024010").is_err());
    }

    #[test]
    fn date_error_carries_input() {
        let err = AssignmentDate::parse("abc").unwrap_err();
        assert_eq!(err.input, "abc");
        assert!(err.to_string().contains("YYYYMMDD"));
    }

    #[test]
    fn date_keeps_leading_zeros_in_stamp() {
        let date = AssignmentDate::parse("00010101").unwrap();
        assert_eq!(date.stamp(), "00010101");
        assert_eq!(date.to_string(), "0001-01-01");
    }

    #[test]
    fn stored_dates_out_of_range_are_rejected() {
        assert!(AssignmentDate::from_stored(-1).is_none());
        assert!(AssignmentDate::from_stored(100_000_000).is_none());
        assert_eq!(
            AssignmentDate::from_stored(20_230_101).map(AssignmentDate::value),
            Some(20_230_101)
        );
    }

    #[test]
    fn describe_missing_date() {
        assert_eq!(describe_date(None), "never");
        assert_eq!(
            describe_date(AssignmentDate::parse("20230101").ok()),
            "2023-01-01"
        );
    }

    #[test]
    fn partner_of_either_slot() {
        let a = PersonId::new(1);
        let b = PersonId::new(2);
        let assignment = Assignment {
            id: AssignmentId::new(1),
            main: a,
            assistant: b,
            date: AssignmentDate::parse("20240101").unwrap(),
        };
        assert_eq!(assignment.partner_of(a), Some(b));
        assert_eq!(assignment.partner_of(b), Some(a));
        assert_eq!(assignment.partner_of(PersonId::new(3)), None);
    }
}
