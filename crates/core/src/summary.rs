//! Risk distribution over a cohort.

use crate::assessment::CohortOutcome;
use crate::stratifier::RiskLevel;
use serde::Serialize;

/// Count and share of one risk level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DistributionEntry {
    pub level: RiskLevel,
    pub count: usize,
    /// Whole-number percentage of successful assessments, rounded half up.
    pub percent: u32,
}

/// How many patients landed on each risk level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RiskDistribution {
    counts: [usize; 4],
    failed: usize,
}

impl RiskDistribution {
    pub fn from_outcomes<'a, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = &'a CohortOutcome>,
    {
        let mut dist = Self::default();
        for outcome in outcomes {
            match &outcome.outcome {
                Ok(result) => dist.record(result.risk_level),
                Err(_) => dist.record_failure(),
            }
        }
        dist
    }

    pub fn record(&mut self, level: RiskLevel) {
        self.counts[level.index()] += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        self.counts[level.index()]
    }

    /// Number of successful assessments.
    pub fn assessed(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn percent(&self, level: RiskLevel) -> u32 {
        let total = self.assessed();
        if total == 0 {
            return 0;
        }
        let count = self.count(level);
        ((count * 100 + total / 2) / total) as u32
    }

    /// One entry per level, least severe first.
    pub fn entries(&self) -> Vec<DistributionEntry> {
        RiskLevel::ALL
            .into_iter()
            .map(|level| DistributionEntry {
                level,
                count: self.count(level),
                percent: self.percent(level),
            })
            .collect()
    }
}
