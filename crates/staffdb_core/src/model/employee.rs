//! Employee domain model.
//!
//! # Responsibility
//! - Define the canonical employee record persisted by the store.
//! - Parse and validate ISO birth dates and gender labels.
//! - Provide the two age derivations used by write and listing paths.
//!
//! # Invariants
//! - `birth_date` is always a valid calendar date.
//! - (`full_name`, `birth_date`) is the identity of a record in storage.
//! - Records are immutable once constructed; there is no update API.

use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage and display format for birth dates.
pub const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

static ISO_DATE_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap_or_else(|err| panic!("invalid date regex: {err}"))
});

/// Employee gender as stored in `employees.gender`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Both variants, in table order.
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    /// Returns the stored/printed label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    /// Parses a gender label, ignoring ASCII case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input validation failures for employee construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeValidationError {
    /// Birth date is not `YYYY-MM-DD` or names an impossible calendar date.
    InvalidDateFormat(String),
    /// Gender label is neither `Male` nor `Female`.
    InvalidGender(String),
}

impl Display for EmployeeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDateFormat(value) => {
                write!(f, "invalid birth date `{value}`; expected YYYY-MM-DD")
            }
            Self::InvalidGender(value) => {
                write!(f, "invalid gender `{value}`; expected Male|Female")
            }
        }
    }
}

impl Error for EmployeeValidationError {}

/// Canonical employee record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// "Last First Middle".
    pub full_name: String,
    /// Serialized as ISO `YYYY-MM-DD`.
    pub birth_date: NaiveDate,
    pub gender: Gender,
}

impl Employee {
    /// Creates a record from a name, an ISO birth date and a typed gender.
    ///
    /// # Errors
    /// - `InvalidDateFormat` when `birth_date` is not `YYYY-MM-DD` or is not
    ///   a real calendar date (e.g. `2001-02-30`).
    pub fn new(
        full_name: impl Into<String>,
        birth_date: &str,
        gender: Gender,
    ) -> Result<Self, EmployeeValidationError> {
        Ok(Self {
            full_name: full_name.into(),
            birth_date: parse_birth_date(birth_date)?,
            gender,
        })
    }

    /// Creates a record from raw command input, including the gender label.
    pub fn parse(
        full_name: impl Into<String>,
        birth_date: &str,
        gender: &str,
    ) -> Result<Self, EmployeeValidationError> {
        let gender = Gender::parse(gender)
            .ok_or_else(|| EmployeeValidationError::InvalidGender(gender.to_string()))?;
        Self::new(full_name, birth_date, gender)
    }

    /// Returns the birth date in storage form.
    pub fn birth_date_iso(&self) -> String {
        self.birth_date.format(BIRTH_DATE_FORMAT).to_string()
    }

    /// Calendar-aware age as of the current local date.
    pub fn calculate_age(&self) -> u32 {
        self.age_on(Local::now().date_naive())
    }

    /// Calendar-aware age as of `today`.
    ///
    /// Year difference, minus one when `today`'s month/day precedes the birth
    /// month/day. Birth dates after `today` yield 0.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        let mut years = today.year() - self.birth_date.year();
        if (today.month(), today.day()) < (self.birth_date.month(), self.birth_date.day()) {
            years -= 1;
        }
        u32::try_from(years).unwrap_or(0)
    }

    /// Plain `today.year - birth_year`, as shown by the sorted listing.
    ///
    /// Differs from [`Employee::age_on`] before the birthday in `today`'s year.
    pub fn year_difference_age(&self, today: NaiveDate) -> i32 {
        today.year() - self.birth_date.year()
    }
}

/// Parses a strict `YYYY-MM-DD` birth date.
pub fn parse_birth_date(value: &str) -> Result<NaiveDate, EmployeeValidationError> {
    if !ISO_DATE_SHAPE.is_match(value) {
        return Err(EmployeeValidationError::InvalidDateFormat(value.to_string()));
    }

    NaiveDate::parse_from_str(value, BIRTH_DATE_FORMAT)
        .map_err(|_| EmployeeValidationError::InvalidDateFormat(value.to_string()))
}
