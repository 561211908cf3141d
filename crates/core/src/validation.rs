//! Patient validation.
//!
//! Turns the stored demographic fields of a [`Patient`] into typed values the engine can
//! use, rejecting records that cannot be assessed. Nothing past this point needs to handle
//! a missing birth date or an unknown gender.

use crate::constants::BIRTH_DATE_FORMAT;
use crate::error::{EngineResult, ValidationError};
use crate::patient::Patient;
use chrono::NaiveDate;
use medilabo_types::Gender;

/// Demographics checked against a reference date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Demographics {
    pub birth_date: NaiveDate,
    pub gender: Gender,
}

/// Validates the demographics of `patient` as of `reference_date`.
///
/// # Errors
///
/// Returns a [`ValidationError`] if:
/// - the birth date is missing or blank,
/// - the birth date is not a `YYYY-MM-DD` calendar date,
/// - the birth date is after `reference_date`,
/// - the gender is not recognised.
pub fn validate_patient(patient: &Patient, reference_date: NaiveDate) -> EngineResult<Demographics> {
    let patient_id = patient.id;

    let raw = patient
        .birth_date
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingBirthDate { patient_id })?;

    let birth_date = NaiveDate::parse_from_str(raw, BIRTH_DATE_FORMAT).map_err(|_| {
        ValidationError::InvalidBirthDate {
            patient_id,
            value: raw.to_string(),
        }
    })?;

    if birth_date > reference_date {
        return Err(ValidationError::BirthDateInFuture {
            patient_id,
            birth_date,
            reference_date,
        });
    }

    let gender =
        Gender::parse(&patient.gender).map_err(|_| ValidationError::UnrecognisedGender {
            patient_id,
            value: patient.gender.clone(),
        })?;

    Ok(Demographics { birth_date, gender })
}
