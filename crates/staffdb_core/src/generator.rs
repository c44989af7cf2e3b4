//! Synthetic employee generation for load testing.
//!
//! # Responsibility
//! - Produce realistic-looking names and birth dates from fixed tables.
//! - Guarantee a queryable fixed-pattern subset in every bulk batch.
//!
//! # Invariants
//! - Name tables are immutable statics keyed by gender.
//! - Generated birth days never exceed 28, so every month is valid.
//! - `generate_bulk(n)` always returns `n + FIXED_PATTERN_BATCH` records.

use crate::model::employee::{Employee, EmployeeValidationError, Gender};
use rand::seq::SliceRandom;
use rand::Rng;

/// Surname used by every fixed-pattern record.
pub const FIXED_PATTERN_SURNAME: &str = "Fedorov";
/// Number of fixed-pattern records appended to each bulk batch.
pub const FIXED_PATTERN_BATCH: usize = 100;

const BIRTH_YEAR_MIN: i32 = 1950;
const BIRTH_YEAR_MAX: i32 = 2000;
const BIRTH_DAY_MAX: u32 = 28;

const MALE_FIRST_NAMES: &[&str] = &[
    "Ivan",
    "Petr",
    "Alex",
    "Max",
    "Anton",
    "Pavel",
    "Mark",
    "Stanislav",
    "Sergey",
];
const FEMALE_FIRST_NAMES: &[&str] = &[
    "Anna",
    "Maria",
    "Elena",
    "Olga",
    "Natalia",
    "Ekaterina",
    "Irina",
    "Tatiana",
    "Svetlana",
];
const MALE_MIDDLE_NAMES: &[&str] = &[
    "Sergeevich",
    "Petrovich",
    "Alexandrovich",
    "Mikhailovich",
    "Nikolaevich",
];
const FEMALE_MIDDLE_NAMES: &[&str] = &[
    "Sergeevna",
    "Petrovna",
    "Alexandrovna",
    "Mikhailovna",
    "Nikolaevna",
];
const MALE_LAST_NAMES: &[&str] = &["Ivanov", "Petrov", "Sidorov", "Fedorov", "Semenov"];
const FEMALE_LAST_NAMES: &[&str] = &["Ivanova", "Petrova", "Sidorova", "Fedorova", "Semenova"];

/// Name lists for one gender.
#[derive(Debug, Clone, Copy)]
pub struct NameTable {
    pub first: &'static [&'static str],
    pub middle: &'static [&'static str],
    pub last: &'static [&'static str],
}

/// Returns the fixed name table for `gender`.
pub fn name_table(gender: Gender) -> NameTable {
    match gender {
        Gender::Male => NameTable {
            first: MALE_FIRST_NAMES,
            middle: MALE_MIDDLE_NAMES,
            last: MALE_LAST_NAMES,
        },
        Gender::Female => NameTable {
            first: FEMALE_FIRST_NAMES,
            middle: FEMALE_MIDDLE_NAMES,
            last: FEMALE_LAST_NAMES,
        },
    }
}

/// Random record source over any `Rng`.
pub struct EmployeeGenerator<R: Rng> {
    rng: R,
}

impl<R: Rng> EmployeeGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Picks Male or Female uniformly.
    pub fn random_gender(&mut self) -> Gender {
        if self.rng.gen_bool(0.5) {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    /// Builds "Last First Middle" from the table of `gender`.
    pub fn random_name(&mut self, gender: Gender) -> String {
        let table = name_table(gender);
        let last = self.pick(table.last);
        let first = self.pick(table.first);
        let middle = self.pick(table.middle);
        format!("{last} {first} {middle}")
    }

    /// Builds a Male name with the fixed surname.
    pub fn fixed_pattern_name(&mut self) -> String {
        let table = name_table(Gender::Male);
        let first = self.pick(table.first);
        let middle = self.pick(table.middle);
        format!("{FIXED_PATTERN_SURNAME} {first} {middle}")
    }

    /// Returns an ISO date with year 1950..=2000, month 1..=12, day 1..=28.
    pub fn random_birth_date(&mut self) -> String {
        let year = self.rng.gen_range(BIRTH_YEAR_MIN..=BIRTH_YEAR_MAX);
        let month = self.rng.gen_range(1..=12u32);
        let day = self.rng.gen_range(1..=BIRTH_DAY_MAX);
        format!("{year:04}-{month:02}-{day:02}")
    }

    /// Generates `count` random records plus the fixed-pattern batch.
    ///
    /// Generated dates always parse; the error path exists because records
    /// go through the same validation as user input.
    pub fn generate_bulk(&mut self, count: usize) -> Result<Vec<Employee>, EmployeeValidationError> {
        let mut employees = Vec::with_capacity(count + FIXED_PATTERN_BATCH);

        for _ in 0..count {
            let gender = self.random_gender();
            let name = self.random_name(gender);
            let birth_date = self.random_birth_date();
            employees.push(Employee::new(name, &birth_date, gender)?);
        }

        for _ in 0..FIXED_PATTERN_BATCH {
            let name = self.fixed_pattern_name();
            let birth_date = self.random_birth_date();
            employees.push(Employee::new(name, &birth_date, Gender::Male)?);
        }

        Ok(employees)
    }

    fn pick(&mut self, values: &'static [&'static str]) -> &'static str {
        values.choose(&mut self.rng).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::{name_table, FIXED_PATTERN_SURNAME};
    use crate::model::employee::Gender;

    #[test]
    fn name_tables_have_reference_sizes() {
        for gender in Gender::ALL {
            let table = name_table(gender);
            assert_eq!(table.first.len(), 9);
            assert_eq!(table.middle.len(), 5);
            assert_eq!(table.last.len(), 5);
        }
    }

    #[test]
    fn fixed_surname_is_a_male_last_name() {
        assert!(name_table(Gender::Male)
            .last
            .contains(&FIXED_PATTERN_SURNAME));
    }
}
