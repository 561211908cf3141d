//! Read-only record sources.
//!
//! The engine never depends on how patients and notes are stored. Callers supply them through
//! the [`PatientRepository`] and [`NoteRepository`] capabilities; [`InMemoryRecords`] is the
//! bundled implementation, loadable from a YAML cohort file (see [`cohort`]).

pub mod cohort;
pub mod memory;

pub use memory::InMemoryRecords;

use crate::error::RepositoryResult;
use crate::patient::{ClinicalNote, Patient, PatientId};

/// Supplies patient records.
pub trait PatientRepository {
    /// # Errors
    ///
    /// Returns [`crate::RepositoryError::PatientNotFound`] for an unknown id.
    fn patient(&self, id: PatientId) -> RepositoryResult<Patient>;

    /// All patients, ordered by id.
    fn patients(&self) -> RepositoryResult<Vec<Patient>>;
}

/// Supplies clinical notes.
pub trait NoteRepository {
    /// Notes for one patient, in authorship order. Unknown patients have no notes.
    fn notes_for(&self, patient_id: PatientId) -> RepositoryResult<Vec<ClinicalNote>>;

    /// Every note in the source.
    fn notes(&self) -> RepositoryResult<Vec<ClinicalNote>>;
}
