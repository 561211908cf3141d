//! In-memory record store.

use super::{NoteRepository, PatientRepository};
use crate::error::{RepositoryError, RepositoryResult};
use crate::patient::{ClinicalNote, Patient, PatientId};
use medilabo_types::Gender;
use std::collections::BTreeMap;

/// Patients and notes held in memory.
///
/// Notes are kept in authorship order (oldest first, ties in insertion order). Notes may be
/// appended; existing notes are never changed.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRecords {
    patients: BTreeMap<PatientId, Patient>,
    notes: Vec<ClinicalNote>,
}

impl InMemoryRecords {
    /// # Errors
    ///
    /// Returns [`RepositoryError::DuplicatePatient`] if two patients share an id.
    pub fn new(patients: Vec<Patient>, notes: Vec<ClinicalNote>) -> RepositoryResult<Self> {
        let mut by_id = BTreeMap::new();
        for patient in patients {
            let id = patient.id;
            if by_id.insert(id, patient).is_some() {
                return Err(RepositoryError::DuplicatePatient(id));
            }
        }

        let mut records = Self {
            patients: by_id,
            notes: Vec::with_capacity(notes.len()),
        };
        for note in notes {
            records.append_note(note);
        }
        Ok(records)
    }

    /// Add a new note.
    pub fn append_note(&mut self, note: ClinicalNote) {
        if !self.patients.contains_key(&note.patient_id) {
            tracing::warn!(
                "note {} refers to unknown patient {}",
                note.id,
                note.patient_id
            );
        }
        let pos = self.notes.partition_point(|n| n.date <= note.date);
        self.notes.insert(pos, note);
    }

    pub fn patient_count(&self) -> usize {
        self.patients.len()
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    /// Patients whose "first last" name contains `query`, ignoring case.
    ///
    /// A blank query matches every patient. `gender` keeps only patients whose stored gender
    /// parses to that value; records with an unrecognised gender never match a gender filter.
    /// Results are ordered by id.
    pub fn search_patients(&self, query: &str, gender: Option<Gender>) -> Vec<&Patient> {
        let query = query.trim().to_lowercase();
        self.patients
            .values()
            .filter(|p| gender.map_or(true, |g| Gender::parse(&p.gender).ok() == Some(g)))
            .filter(|p| query.is_empty() || p.full_name().to_lowercase().contains(&query))
            .collect()
    }

    /// Notes whose content or patient name contains `query`, ignoring case.
    ///
    /// A blank query matches every note. `patient` narrows the search to one patient.
    /// Results are newest first.
    pub fn search_notes(&self, query: &str, patient: Option<PatientId>) -> Vec<&ClinicalNote> {
        let query = query.trim().to_lowercase();
        self.notes
            .iter()
            .rev()
            .filter(|n| patient.map_or(true, |id| n.patient_id == id))
            .filter(|n| {
                if query.is_empty() {
                    return true;
                }
                let name_hit = self
                    .patients
                    .get(&n.patient_id)
                    .is_some_and(|p| p.full_name().to_lowercase().contains(&query));
                name_hit || n.content.to_lowercase().contains(&query)
            })
            .collect()
    }
}

impl PatientRepository for InMemoryRecords {
    fn patient(&self, id: PatientId) -> RepositoryResult<Patient> {
        self.patients
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::PatientNotFound(id))
    }

    fn patients(&self) -> RepositoryResult<Vec<Patient>> {
        Ok(self.patients.values().cloned().collect())
    }
}

impl NoteRepository for InMemoryRecords {
    fn notes_for(&self, patient_id: PatientId) -> RepositoryResult<Vec<ClinicalNote>> {
        Ok(self
            .notes
            .iter()
            .filter(|n| n.patient_id == patient_id)
            .cloned()
            .collect())
    }

    fn notes(&self) -> RepositoryResult<Vec<ClinicalNote>> {
        Ok(self.notes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::AssessmentEngine;
    use crate::patient::fixtures::{note, patient};
    use crate::stratifier::RiskLevel;
    use chrono::NaiveDate;

    fn dated(id: &str, patient_id: u64, day: u32, content: &str) -> ClinicalNote {
        let mut n = note(id, patient_id, content);
        n.date = NaiveDate::from_ymd_opt(2024, 12, day).expect("valid date");
        n
    }

    fn records() -> InMemoryRecords {
        InMemoryRecords::new(
            vec![patient(2, "1972-08-22", "F"), patient(1, "1985-03-15", "M")],
            vec![
                dated("b", 1, 20, "Taille et Poids normaux."),
                dated("a", 1, 15, "Taux de Cholestérol normal."),
                dated("c", 2, 18, "Microalbumine détectée."),
            ],
        )
        .expect("records")
    }

    #[test]
    fn rejects_duplicate_patient_ids() {
        let err = InMemoryRecords::new(
            vec![patient(1, "1985-03-15", "M"), patient(1, "1990-01-01", "F")],
            vec![],
        )
        .expect_err("duplicate");
        assert!(matches!(err, RepositoryError::DuplicatePatient(id) if id == PatientId::new(1)));
    }

    #[test]
    fn patients_are_listed_by_id() {
        let ids: Vec<u64> = records()
            .patients()
            .expect("patients")
            .iter()
            .map(|p| p.id.get())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn unknown_patient_is_not_found() {
        let err = records().patient(PatientId::new(9)).expect_err("missing");
        assert!(matches!(err, RepositoryError::PatientNotFound(_)));
    }

    #[test]
    fn notes_for_patient_in_date_order() {
        let ids: Vec<String> = records()
            .notes_for(PatientId::new(1))
            .expect("notes")
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(records().notes_for(PatientId::new(9)).expect("notes").is_empty());
    }

    #[test]
    fn search_matches_content_and_name() {
        let r = records();
        let by_content: Vec<&str> = r
            .search_notes("cholestérol", None)
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(by_content, vec!["a"]);

        let by_name: Vec<&str> = r
            .search_notes("PATIENT2", None)
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(by_name, vec!["c"]);

        assert_eq!(r.search_notes("  ", None).len(), 3);
        assert_eq!(r.search_notes("", Some(PatientId::new(1))).len(), 2);
        assert!(r.search_notes("normal", Some(PatientId::new(2))).is_empty());
    }

    fn ids(patients: Vec<&Patient>) -> Vec<u64> {
        patients.iter().map(|p| p.id.get()).collect()
    }

    #[test]
    fn search_patients_by_name() {
        let r = records();
        assert_eq!(ids(r.search_patients("PATIENT2", None)), vec![2]);
        assert_eq!(ids(r.search_patients("test patient", None)), vec![1, 2]);
        assert_eq!(ids(r.search_patients("  ", None)), vec![1, 2]);
        assert!(r.search_patients("Dupont", None).is_empty());
    }

    #[test]
    fn search_patients_by_gender() {
        let mut unknown = patient(3, "1980-01-01", "X");
        unknown.last_name = "Inconnu".into();
        let r = InMemoryRecords::new(
            vec![
                patient(1, "1985-03-15", "M"),
                patient(2, "1972-08-22", "Féminin"),
                unknown,
            ],
            vec![],
        )
        .expect("records");

        assert_eq!(ids(r.search_patients("", Some(Gender::Female))), vec![2]);
        assert_eq!(ids(r.search_patients("", Some(Gender::Male))), vec![1]);
        assert_eq!(ids(r.search_patients("", None)), vec![1, 2, 3]);
        assert!(r.search_patients("patient2", Some(Gender::Male)).is_empty());
    }

    #[test]
    fn appended_note_can_only_raise_risk() {
        let mut r = records();
        let engine = AssessmentEngine::default();
        let reference = NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date");

        let before = engine
            .assess_by_id(&r, PatientId::new(2), reference)
            .expect("assess");
        r.append_note(dated("d", 2, 30, "Hémoglobine A1C élevée. Vertiges, Rechute."));
        let after = engine
            .assess_by_id(&r, PatientId::new(2), reference)
            .expect("assess");

        assert!(after.triggers_found.is_superset(&before.triggers_found));
        assert_eq!(before.risk_level, RiskLevel::None);
        assert_eq!(after.risk_level, RiskLevel::InDanger);
        assert_eq!(r.note_count(), 4);
    }
}
