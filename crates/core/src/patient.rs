//! Patient and clinical note records as delivered by the record source.
//!
//! These are the inputs to the engine. Demographic fields arrive as they are stored
//! (birth date and gender as text) and are only checked when an assessment runs, see
//! [`crate::validation`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable patient identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(u64);

impl PatientId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for PatientId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A patient record.
///
/// `first_name`, `last_name`, `address` and `phone` are display data and play no part in
/// the assessment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Patient {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    /// Date of birth as stored (`YYYY-MM-DD`). May be absent on incomplete records.
    #[serde(default)]
    pub birth_date: Option<String>,
    /// Gender as stored (`M` / `F`).
    pub gender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Patient {
    /// "First Last", as shown on the assessment screen.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// A free-text clinical note about one patient. Immutable once written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClinicalNote {
    pub id: String,
    pub patient_id: PatientId,
    pub date: NaiveDate,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practitioner: Option<String>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn patient(id: u64, birth_date: &str, gender: &str) -> Patient {
        Patient {
            id: PatientId::new(id),
            first_name: "Test".into(),
            last_name: format!("Patient{id}"),
            birth_date: Some(birth_date.into()),
            gender: gender.into(),
            address: None,
            phone: None,
        }
    }

    pub fn note(id: &str, patient_id: u64, content: &str) -> ClinicalNote {
        ClinicalNote {
            id: id.into(),
            patient_id: PatientId::new(patient_id),
            date: NaiveDate::from_ymd_opt(2024, 12, 1).expect("valid date"),
            content: content.into(),
            practitioner: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_first_and_last() {
        let p = fixtures::patient(1, "1985-03-15", "M");
        assert_eq!(p.full_name(), "Test Patient1");
    }

    #[test]
    fn patient_id_parses_from_text() {
        assert_eq!(" 42 ".parse::<PatientId>().expect("parse"), PatientId::new(42));
        assert!("abc".parse::<PatientId>().is_err());
    }

    #[test]
    fn note_deserialises_without_content() {
        let note: ClinicalNote = serde_json::from_str(
            r#"{"id":"7","patientId":3,"date":"2024-12-15"}"#,
        )
        .expect("parse note");
        assert_eq!(note.patient_id, PatientId::new(3));
        assert!(note.content.is_empty());
        assert!(note.practitioner.is_none());
    }

    #[test]
    fn patient_rejects_unknown_fields() {
        let err = serde_json::from_str::<Patient>(
            r#"{"id":1,"firstName":"A","lastName":"B","gender":"M","risk":"None"}"#,
        )
        .expect_err("unknown field rejected");
        assert!(err.to_string().contains("risk"));
    }
}
