//! Assessment engine.
//!
//! Composes validation, age calculation, trigger scanning and stratification into a single
//! call. The engine holds only its immutable configuration, performs no I/O and never reads
//! the clock: the reference date is always supplied by the caller.

use crate::age::age_on;
use crate::config::EngineConfig;
use crate::error::{EngineResult, MedilaboResult, ValidationError};
use crate::patient::{ClinicalNote, Patient, PatientId};
use crate::repositories::{NoteRepository, PatientRepository};
use crate::stratifier::RiskLevel;
use crate::triggers::TriggerSet;
use crate::validation::validate_patient;
use chrono::NaiveDate;
use medilabo_types::Gender;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of assessing one patient. Built fresh on every call and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub patient_id: PatientId,
    pub patient_name: String,
    pub reference_date: NaiveDate,
    pub age_at_assessment: u32,
    pub gender: Gender,
    pub triggers_found: TriggerSet,
    pub trigger_count: usize,
    pub risk_level: RiskLevel,
}

/// One entry of a cohort run.
#[derive(Debug)]
pub struct CohortOutcome {
    pub patient_id: PatientId,
    pub outcome: EngineResult<AssessmentResult>,
}

/// Stateless diabetes-risk assessment over patient and note data.
#[derive(Clone, Debug, Default)]
pub struct AssessmentEngine {
    cfg: Arc<EngineConfig>,
}

impl AssessmentEngine {
    pub fn new(cfg: Arc<EngineConfig>) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Assess `patient` as of `reference_date`.
    ///
    /// `notes` may contain notes for other patients; only those whose `patient_id` matches
    /// are scanned.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the patient's birth date or gender cannot be used. No
    /// stratification happens in that case.
    pub fn assess(
        &self,
        patient: &Patient,
        notes: &[ClinicalNote],
        reference_date: NaiveDate,
    ) -> EngineResult<AssessmentResult> {
        let own_notes = notes.iter().filter(|n| n.patient_id == patient.id);
        self.evaluate(patient, own_notes, reference_date)
    }

    /// Assess every patient independently.
    ///
    /// Returns one outcome per patient, in input order. A failing patient does not affect the
    /// others. With the `parallel` feature enabled patients are assessed on the rayon pool.
    pub fn assess_cohort(
        &self,
        patients: &[Patient],
        notes: &[ClinicalNote],
        reference_date: NaiveDate,
    ) -> Vec<CohortOutcome> {
        let mut by_patient: HashMap<PatientId, Vec<&ClinicalNote>> = HashMap::new();
        for note in notes {
            by_patient.entry(note.patient_id).or_default().push(note);
        }

        let assess_one = |patient: &Patient| {
            let own_notes = by_patient.get(&patient.id).into_iter().flatten().copied();
            let outcome = self.evaluate(patient, own_notes, reference_date);
            if let Err(e) = &outcome {
                tracing::warn!("skipping patient in cohort: {}", e);
            }
            CohortOutcome {
                patient_id: patient.id,
                outcome,
            }
        };

        #[cfg(feature = "parallel")]
        let outcomes = {
            use rayon::prelude::*;
            patients.par_iter().map(assess_one).collect::<Vec<_>>()
        };
        #[cfg(not(feature = "parallel"))]
        let outcomes = patients.iter().map(assess_one).collect::<Vec<_>>();

        tracing::info!(patients = patients.len(), "cohort assessment complete");
        outcomes
    }

    /// Fetch a patient and their notes from `records` and assess them.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MedilaboError::Repository`] if the patient is unknown or the record
    /// source fails, and [`crate::MedilaboError::Validation`] if the record cannot be assessed.
    pub fn assess_by_id<R>(
        &self,
        records: &R,
        patient_id: PatientId,
        reference_date: NaiveDate,
    ) -> MedilaboResult<AssessmentResult>
    where
        R: PatientRepository + NoteRepository + ?Sized,
    {
        let patient = records.patient(patient_id)?;
        let notes = records.notes_for(patient_id)?;
        Ok(self.assess(&patient, &notes, reference_date)?)
    }

    fn evaluate<'n, I>(
        &self,
        patient: &Patient,
        notes: I,
        reference_date: NaiveDate,
    ) -> EngineResult<AssessmentResult>
    where
        I: IntoIterator<Item = &'n ClinicalNote>,
    {
        let demographics = validate_patient(patient, reference_date)?;
        let age = age_on(demographics.birth_date, reference_date).ok_or(
            ValidationError::BirthDateInFuture {
                patient_id: patient.id,
                birth_date: demographics.birth_date,
                reference_date,
            },
        )?;

        let triggers = self.cfg.vocabulary().scanner().scan(notes);
        let trigger_count = triggers.len();
        let risk_level = self
            .cfg
            .stratifier()
            .classify(age, demographics.gender, trigger_count);

        tracing::debug!(
            patient_id = %patient.id,
            age,
            trigger_count,
            risk = %risk_level,
            "patient assessed"
        );

        Ok(AssessmentResult {
            patient_id: patient.id,
            patient_name: patient.full_name(),
            reference_date,
            age_at_assessment: age,
            gender: demographics.gender,
            triggers_found: triggers,
            trigger_count,
            risk_level,
        })
    }
}
