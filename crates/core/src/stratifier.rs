//! Risk levels and the age/gender decision table.
//!
//! The table has three mutually exclusive branches:
//!
//! | Branch                  | Thresholds (inclusive, highest met wins)                 |
//! |-------------------------|----------------------------------------------------------|
//! | age > 30                | ≥6 Early Onset, ≥4 In Danger, ≥2 Borderline, else None   |
//! | age ≤ 30, male          | ≥5 Early Onset, ≥3 In Danger, else None                  |
//! | age ≤ 30, female        | ≥7 Early Onset, ≥4 In Danger, else None                  |
//!
//! A table is only accepted if each branch lists strictly decreasing thresholds paired with
//! strictly decreasing levels, which makes classification monotone in the trigger count.

use crate::constants::{
    DEFAULT_AGE_THRESHOLD, DEFAULT_OLDER_THRESHOLDS, DEFAULT_YOUNGER_FEMALE_THRESHOLDS,
    DEFAULT_YOUNGER_MALE_THRESHOLDS,
};
use crate::error::{ConfigError, ConfigResult};
use medilabo_types::Gender;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Diabetes risk, ordered by severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    None,
    Borderline,
    #[serde(rename = "In Danger", alias = "InDanger")]
    InDanger,
    #[serde(rename = "Early Onset", alias = "EarlyOnset")]
    EarlyOnset,
}

impl RiskLevel {
    /// All levels, least severe first.
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::None,
        RiskLevel::Borderline,
        RiskLevel::InDanger,
        RiskLevel::EarlyOnset,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::None => "None",
            RiskLevel::Borderline => "Borderline",
            RiskLevel::InDanger => "In Danger",
            RiskLevel::EarlyOnset => "Early Onset",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            RiskLevel::None => 0,
            RiskLevel::Borderline => 1,
            RiskLevel::InDanger => 2,
            RiskLevel::EarlyOnset => 3,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    /// Accepts display labels ("In Danger") and variant names ("InDanger"), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        RiskLevel::ALL
            .into_iter()
            .find(|level| format!("{level:?}").eq_ignore_ascii_case(&compact))
            .ok_or_else(|| format!("unknown risk level '{s}'"))
    }
}

/// Which rule set applies to a patient.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgeBranch {
    Older,
    YoungerMale,
    YoungerFemale,
}

/// One row of a branch: at least `min_triggers` distinct triggers gives `level`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Threshold {
    pub min_triggers: usize,
    pub level: RiskLevel,
}

impl From<&(usize, RiskLevel)> for Threshold {
    fn from(&(min_triggers, level): &(usize, RiskLevel)) -> Self {
        Self {
            min_triggers,
            level,
        }
    }
}

/// Age/gender decision table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DecisionTable {
    /// Patients strictly older than this use the `older` branch.
    pub age_threshold: u32,
    pub older: Vec<Threshold>,
    pub younger_male: Vec<Threshold>,
    pub younger_female: Vec<Threshold>,
}

impl Default for DecisionTable {
    fn default() -> Self {
        Self {
            age_threshold: DEFAULT_AGE_THRESHOLD,
            older: DEFAULT_OLDER_THRESHOLDS.iter().map(Threshold::from).collect(),
            younger_male: DEFAULT_YOUNGER_MALE_THRESHOLDS
                .iter()
                .map(Threshold::from)
                .collect(),
            younger_female: DEFAULT_YOUNGER_FEMALE_THRESHOLDS
                .iter()
                .map(Threshold::from)
                .collect(),
        }
    }
}

impl DecisionTable {
    /// Check that every branch is well ordered.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDecisionTable`] if a branch maps to `None`, or its
    /// thresholds or levels are not strictly decreasing.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, rows) in [
            ("older", &self.older),
            ("youngerMale", &self.younger_male),
            ("youngerFemale", &self.younger_female),
        ] {
            if let Some(row) = rows.iter().find(|r| r.level == RiskLevel::None) {
                return Err(ConfigError::InvalidDecisionTable(format!(
                    "{name}: threshold {} maps to None; None is the fallback and cannot be listed",
                    row.min_triggers
                )));
            }
            for pair in rows.windows(2) {
                if pair[1].min_triggers >= pair[0].min_triggers {
                    return Err(ConfigError::InvalidDecisionTable(format!(
                        "{name}: thresholds must strictly decrease ({} then {})",
                        pair[0].min_triggers, pair[1].min_triggers
                    )));
                }
                if pair[1].level >= pair[0].level {
                    return Err(ConfigError::InvalidDecisionTable(format!(
                        "{name}: levels must strictly decrease ({} then {})",
                        pair[0].level, pair[1].level
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn branch(&self, age: u32, gender: Gender) -> AgeBranch {
        if age > self.age_threshold {
            AgeBranch::Older
        } else {
            match gender {
                Gender::Male => AgeBranch::YoungerMale,
                Gender::Female => AgeBranch::YoungerFemale,
            }
        }
    }

    pub fn rows(&self, branch: AgeBranch) -> &[Threshold] {
        match branch {
            AgeBranch::Older => &self.older,
            AgeBranch::YoungerMale => &self.younger_male,
            AgeBranch::YoungerFemale => &self.younger_female,
        }
    }
}

/// Maps age, gender and trigger count to a [`RiskLevel`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RiskStratifier {
    table: DecisionTable,
}

impl RiskStratifier {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDecisionTable`] if `table` fails [`DecisionTable::validate`].
    pub fn new(table: DecisionTable) -> ConfigResult<Self> {
        table.validate()?;
        Ok(Self { table })
    }

    pub fn table(&self) -> &DecisionTable {
        &self.table
    }

    pub fn classify(&self, age: u32, gender: Gender, trigger_count: usize) -> RiskLevel {
        let branch = self.table.branch(age, gender);
        self.table
            .rows(branch)
            .iter()
            .find(|row| trigger_count >= row.min_triggers)
            .map(|row| row.level)
            .unwrap_or(RiskLevel::None)
    }
}

static DEFAULT_STRATIFIER: LazyLock<RiskStratifier> = LazyLock::new(RiskStratifier::default);

/// Classify with the built-in decision table.
pub fn classify(age: u32, gender: Gender, trigger_count: usize) -> RiskLevel {
    DEFAULT_STRATIFIER.classify(age, gender, trigger_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn boundary_scenarios() {
        assert_eq!(classify(35, Gender::Female, 2), RiskLevel::Borderline);
        assert_eq!(classify(35, Gender::Male, 6), RiskLevel::EarlyOnset);
        assert_eq!(classify(28, Gender::Male, 3), RiskLevel::InDanger);
        assert_eq!(classify(28, Gender::Male, 2), RiskLevel::None);
        assert_eq!(classify(28, Gender::Female, 4), RiskLevel::InDanger);
        assert_eq!(classify(28, Gender::Female, 7), RiskLevel::EarlyOnset);
    }

    #[test]
    fn older_branch_thresholds() {
        let cases = [
            (0, RiskLevel::None),
            (1, RiskLevel::None),
            (2, RiskLevel::Borderline),
            (3, RiskLevel::Borderline),
            (4, RiskLevel::InDanger),
            (5, RiskLevel::InDanger),
            (6, RiskLevel::EarlyOnset),
            (12, RiskLevel::EarlyOnset),
        ];
        for (count, expected) in cases {
            assert_eq!(classify(31, Gender::Male, count), expected, "count {count}");
            assert_eq!(classify(31, Gender::Female, count), expected, "count {count}");
        }
    }

    #[test]
    fn age_thirty_uses_younger_branch() {
        assert_eq!(classify(30, Gender::Female, 2), RiskLevel::None);
        assert_eq!(classify(31, Gender::Female, 2), RiskLevel::Borderline);
        assert_eq!(classify(30, Gender::Male, 5), RiskLevel::EarlyOnset);
    }

    #[test]
    fn younger_branches_have_no_borderline() {
        for count in 0..=12 {
            assert_ne!(classify(25, Gender::Male, count), RiskLevel::Borderline);
            assert_ne!(classify(25, Gender::Female, count), RiskLevel::Borderline);
        }
        assert_eq!(classify(25, Gender::Female, 6), RiskLevel::InDanger);
        assert_eq!(classify(25, Gender::Male, 4), RiskLevel::InDanger);
    }

    #[test]
    fn zero_triggers_is_none_everywhere() {
        for age in [0, 18, 30, 31, 90] {
            for gender in [Gender::Male, Gender::Female] {
                assert_eq!(classify(age, gender, 0), RiskLevel::None);
            }
        }
    }

    #[test]
    fn levels_are_totally_ordered() {
        assert!(RiskLevel::None < RiskLevel::Borderline);
        assert!(RiskLevel::Borderline < RiskLevel::InDanger);
        assert!(RiskLevel::InDanger < RiskLevel::EarlyOnset);
        let mut sorted = RiskLevel::ALL;
        sorted.reverse();
        sorted.sort();
        assert_eq!(sorted, RiskLevel::ALL);
    }

    #[test]
    fn risk_level_labels_round_trip() {
        for level in RiskLevel::ALL {
            assert_eq!(level.label().parse::<RiskLevel>(), Ok(level));
        }
        assert_eq!("earlyonset".parse::<RiskLevel>(), Ok(RiskLevel::EarlyOnset));
        assert!("Critical".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn risk_level_serialises_with_display_label() {
        let json = serde_json::to_string(&RiskLevel::InDanger).expect("serialise");
        assert_eq!(json, "\"In Danger\"");
        let parsed: RiskLevel = serde_json::from_str("\"EarlyOnset\"").expect("alias");
        assert_eq!(parsed, RiskLevel::EarlyOnset);
    }

    #[test]
    fn free_classify_uses_the_built_in_table() {
        let stratifier = RiskStratifier::default();
        for count in 0..=12 {
            assert_eq!(
                classify(45, Gender::Female, count),
                stratifier.classify(45, Gender::Female, count)
            );
        }
        assert_eq!(DEFAULT_STRATIFIER.table(), &DecisionTable::default());
    }

    #[test]
    fn default_table_is_valid() {
        DecisionTable::default().validate().expect("default table valid");
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let mut table = DecisionTable::default();
        table.older = vec![
            Threshold { min_triggers: 2, level: RiskLevel::EarlyOnset },
            Threshold { min_triggers: 4, level: RiskLevel::InDanger },
        ];
        let err = RiskStratifier::new(table).expect_err("unordered thresholds");
        assert!(err.to_string().contains("thresholds must strictly decrease"));
    }

    #[test]
    fn rejects_inverted_levels() {
        let mut table = DecisionTable::default();
        table.younger_male = vec![
            Threshold { min_triggers: 5, level: RiskLevel::InDanger },
            Threshold { min_triggers: 3, level: RiskLevel::EarlyOnset },
        ];
        let err = RiskStratifier::new(table).expect_err("inverted levels");
        assert!(err.to_string().contains("levels must strictly decrease"));
    }

    #[test]
    fn rejects_listed_none_level() {
        let mut table = DecisionTable::default();
        table.younger_female = vec![Threshold { min_triggers: 1, level: RiskLevel::None }];
        assert!(RiskStratifier::new(table).is_err());
    }

    #[test]
    fn custom_table_changes_classification() {
        let mut table = DecisionTable::default();
        table.age_threshold = 40;
        let stratifier = RiskStratifier::new(table).expect("valid table");
        assert_eq!(stratifier.classify(35, Gender::Female, 2), RiskLevel::None);
        assert_eq!(stratifier.classify(41, Gender::Female, 2), RiskLevel::Borderline);
    }

    fn gender() -> impl Strategy<Value = Gender> {
        prop_oneof![Just(Gender::Male), Just(Gender::Female)]
    }

    proptest! {
        #[test]
        fn more_triggers_never_lower_risk(
            age in 0u32..110,
            gender in gender(),
            a in 0usize..15,
            b in 0usize..15,
        ) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(classify(age, gender, high) >= classify(age, gender, low));
        }

        #[test]
        fn classification_is_deterministic(age in 0u32..110, gender in gender(), n in 0usize..15) {
            prop_assert_eq!(classify(age, gender, n), classify(age, gender, n));
        }
    }
}
