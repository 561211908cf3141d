//! Engine configuration.
//!
//! The trigger vocabulary and decision table are resolved once at process startup and then
//! shared read-only by every assessment. Nothing in this crate reads environment variables;
//! binaries decide where an override file comes from and pass the path in.
//!
//! An override file is YAML. Both keys are optional and fall back to the built-in defaults:
//!
//! ```yaml
//! vocabulary:
//!   - Hémoglobine A1C
//!   - Microalbumine
//! decisionTable:
//!   ageThreshold: 30
//!   older:
//!     - { minTriggers: 6, level: EarlyOnset }
//!   youngerMale: []
//!   youngerFemale: []
//! ```

use crate::error::{describe_path_error, ConfigError, ConfigResult};
use crate::stratifier::{DecisionTable, RiskStratifier};
use crate::triggers::TriggerVocabulary;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration resolved at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    vocabulary: TriggerVocabulary,
    stratifier: RiskStratifier,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct EngineConfigFile {
    #[serde(default)]
    vocabulary: Option<Vec<String>>,
    #[serde(default)]
    decision_table: Option<DecisionTable>,
}

impl EngineConfig {
    pub fn new(vocabulary: TriggerVocabulary, stratifier: RiskStratifier) -> Self {
        Self {
            vocabulary,
            stratifier,
        }
    }

    pub fn vocabulary(&self) -> &TriggerVocabulary {
        &self.vocabulary
    }

    pub fn stratifier(&self) -> &RiskStratifier {
        &self.stratifier
    }

    /// Parse an override document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] with the offending field path if the YAML does not match
    /// the schema (unknown keys included), or the vocabulary/table validation error.
    pub fn from_yaml_str(yaml_text: &str) -> ConfigResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        let file: EngineConfigFile = serde_path_to_error::deserialize(deserializer).map_err(|e| {
            let (path, message) = describe_path_error(e);
            ConfigError::Parse { path, message }
        })?;

        let vocabulary = match file.vocabulary {
            Some(terms) => TriggerVocabulary::new(terms)?,
            None => TriggerVocabulary::default(),
        };
        let stratifier = match file.decision_table {
            Some(table) => RiskStratifier::new(table)?,
            None => RiskStratifier::default(),
        };

        Ok(Self::new(vocabulary, stratifier))
    }

    /// Read and parse an override file.
    pub fn from_yaml_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }
}

/// Resolve the engine configuration from an optional override file.
///
/// With no override the built-in vocabulary and decision table are used.
pub fn resolve_engine_config(override_path: Option<PathBuf>) -> ConfigResult<EngineConfig> {
    match override_path {
        Some(path) => {
            let cfg = EngineConfig::from_yaml_file(&path)?;
            tracing::info!(
                path = %path.display(),
                terms = cfg.vocabulary().len(),
                "loaded engine config"
            );
            Ok(cfg)
        }
        None => {
            tracing::debug!("using built-in engine config");
            Ok(EngineConfig::default())
        }
    }
}
