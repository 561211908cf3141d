//! # MediLabo Core
//!
//! Diabetes-risk assessment for MediLabo patient records.
//!
//! Clinical notes are scanned for a fixed vocabulary of trigger terms. The number of distinct
//! triggers, together with the patient's age and gender, selects a [`RiskLevel`] from an
//! ordered decision table:
//!
//! - [`age`]: whole-year age on a reference date
//! - [`triggers`]: vocabulary and note scanning
//! - [`stratifier`]: risk levels and the decision table
//! - [`assessment`]: the engine composing the above
//! - [`summary`]: risk distribution over a cohort
//! - [`repositories`]: read-only patient and note sources
//!
//! **No I/O in the engine**: record loading lives in [`repositories`], configuration loading in
//! [`config`], and neither is called by [`AssessmentEngine`] itself.

pub mod age;
pub mod assessment;
pub mod config;
pub mod constants;
pub mod error;
pub mod patient;
pub mod repositories;
pub mod stratifier;
pub mod summary;
pub mod triggers;
pub mod validation;

pub use assessment::{AssessmentEngine, AssessmentResult, CohortOutcome};
pub use config::{resolve_engine_config, EngineConfig};
pub use error::{
    ConfigError, ConfigResult, EngineResult, MedilaboError, MedilaboResult, RepositoryError,
    RepositoryResult, ValidationError,
};
pub use patient::{ClinicalNote, Patient, PatientId};
pub use repositories::{InMemoryRecords, NoteRepository, PatientRepository};
pub use stratifier::{classify, DecisionTable, RiskLevel, RiskStratifier, Threshold};
pub use summary::{DistributionEntry, RiskDistribution};
pub use triggers::{scan, TriggerScanner, TriggerSet, TriggerVocabulary};
pub use validation::{validate_patient, Demographics};

pub use medilabo_types::{Gender, NonEmptyText, TextError};
