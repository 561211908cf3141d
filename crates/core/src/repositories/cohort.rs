//! YAML cohort files.
//!
//! A cohort file lists patients and their notes:
//!
//! ```yaml
//! patients:
//!   - id: 1
//!     firstName: Jean
//!     lastName: Dupont
//!     birthDate: 1985-03-15
//!     gender: M
//! notes:
//!   - id: "1"
//!     patientId: 1
//!     date: 2024-12-20
//!     content: Taille et Poids normaux.
//!     practitioner: Dr. Rousseau
//! ```
//!
//! Parsing is strict: unknown keys and wrongly typed values are rejected, and the error names
//! the path to the failing field (for example `patients[0].gender`).

use super::InMemoryRecords;
use crate::error::{describe_path_error, RepositoryError, RepositoryResult};
use crate::patient::{ClinicalNote, Patient};
use serde::Deserialize;
use std::path::Path;

/// Demonstration cohort bundled with the crate.
pub const DEMO_COHORT_YAML: &str = include_str!("../../fixtures/demo_cohort.yaml");

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CohortFile {
    #[serde(default)]
    patients: Vec<Patient>,
    #[serde(default)]
    notes: Vec<ClinicalNote>,
}

/// Parse a cohort document.
///
/// # Errors
///
/// Returns [`RepositoryError::Parse`] if the document does not match the schema and
/// [`RepositoryError::DuplicatePatient`] if a patient id repeats.
pub fn parse_cohort(yaml_text: &str) -> RepositoryResult<InMemoryRecords> {
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
    let file: CohortFile = serde_path_to_error::deserialize(deserializer).map_err(|e| {
        let (path, message) = describe_path_error(e);
        RepositoryError::Parse { path, message }
    })?;
    InMemoryRecords::new(file.patients, file.notes)
}

/// Read and parse a cohort file.
pub fn load_cohort(path: &Path) -> RepositoryResult<InMemoryRecords> {
    let text = std::fs::read_to_string(path).map_err(|source| RepositoryError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_cohort(&text)?;
    tracing::info!(
        path = %path.display(),
        patients = records.patient_count(),
        notes = records.note_count(),
        "loaded cohort"
    );
    Ok(records)
}

/// The bundled demonstration cohort.
pub fn demo_cohort() -> RepositoryResult<InMemoryRecords> {
    parse_cohort(DEMO_COHORT_YAML)
}
