//! Whole-year age calculation.

use chrono::{Datelike, NaiveDate};

/// Age in completed years on `reference_date`.
///
/// The year difference is reduced by one when the birthday has not yet come round in the
/// reference year. A 29 February birthday is therefore reached on 1 March in common years.
///
/// Returns `None` if `birth_date` is after `reference_date`.
pub fn age_on(birth_date: NaiveDate, reference_date: NaiveDate) -> Option<u32> {
    if birth_date > reference_date {
        return None;
    }

    let mut years = reference_date.year() - birth_date.year();
    if (reference_date.month(), reference_date.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }

    u32::try_from(years).ok()
}
