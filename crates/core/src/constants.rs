//! Constants used throughout the MediLabo core crate.
//!
//! The built-in trigger vocabulary and decision table live here so that the defaults are
//! defined in exactly one place. Both can be replaced at startup through an engine config
//! file (see [`crate::config`]).

use crate::stratifier::RiskLevel;

/// Default trigger vocabulary, in display order.
pub const DEFAULT_TRIGGER_TERMS: &[&str] = &[
    "Hémoglobine A1C",
    "Microalbumine",
    "Taille",
    "Poids",
    "Fumeur",
    "Fumeuse",
    "Anormal",
    "Cholestérol",
    "Vertiges",
    "Rechute",
    "Réaction",
    "Anticorps",
];

/// Patients strictly older than this are assessed with the age-independent branch.
pub const DEFAULT_AGE_THRESHOLD: u32 = 30;

/// `(min_triggers, level)` pairs for patients over the age threshold.
pub const DEFAULT_OLDER_THRESHOLDS: &[(usize, RiskLevel)] = &[
    (6, RiskLevel::EarlyOnset),
    (4, RiskLevel::InDanger),
    (2, RiskLevel::Borderline),
];

/// `(min_triggers, level)` pairs for male patients at or under the age threshold.
pub const DEFAULT_YOUNGER_MALE_THRESHOLDS: &[(usize, RiskLevel)] =
    &[(5, RiskLevel::EarlyOnset), (3, RiskLevel::InDanger)];

/// `(min_triggers, level)` pairs for female patients at or under the age threshold.
pub const DEFAULT_YOUNGER_FEMALE_THRESHOLDS: &[(usize, RiskLevel)] =
    &[(7, RiskLevel::EarlyOnset), (4, RiskLevel::InDanger)];

/// Shown to end users whenever an assessment is rejected.
pub const INCOMPLETE_DATA_MESSAGE: &str = "incomplete patient data: cannot assess";

/// Date format accepted for birth dates in patient records.
pub const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";
