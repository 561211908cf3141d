//! Trigger vocabulary and note scanning.
//!
//! A trigger is a vocabulary term whose presence anywhere in a patient's notes counts towards
//! the risk score. Matching is a case-insensitive substring test: `"anormale"` matches the
//! term `Anormal`, and a term repeated across several notes still counts once.
//!
//! Case folding uses Unicode lower-casing, so `HÉMOGLOBINE` matches `Hémoglobine`. Accents are
//! significant: `Hemoglobine` written without the accent does not match.
//!
//! The notes of one patient are lower-cased and joined with a single space before scanning,
//! so a term written across the end of one note and the start of the next still matches.
//! Empty notes contribute nothing to the joined text.

use crate::constants::DEFAULT_TRIGGER_TERMS;
use crate::error::{ConfigError, ConfigResult};
use crate::patient::ClinicalNote;
use medilabo_types::NonEmptyText;
use serde::Serialize;
use std::collections::HashSet;

/// Ordered, duplicate-free list of trigger terms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerVocabulary {
    terms: Vec<NonEmptyText>,
    folded: Vec<String>,
}

impl TriggerVocabulary {
    /// Build a vocabulary from raw terms, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the list is empty, a term is blank, or two terms are equal
    /// once case is ignored.
    pub fn new<I, S>(terms: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut validated = Vec::new();
        let mut folded = Vec::new();

        for raw in terms {
            let term = NonEmptyText::new(raw.as_ref())?;
            let lower = term.as_str().to_lowercase();
            if !seen.insert(lower.clone()) {
                return Err(ConfigError::DuplicateTerm(term.into_inner()));
            }
            validated.push(term);
            folded.push(lower);
        }

        if validated.is_empty() {
            return Err(ConfigError::EmptyVocabulary);
        }

        Ok(Self {
            terms: validated,
            folded,
        })
    }

    pub fn terms(&self) -> &[NonEmptyText] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn scanner(&self) -> TriggerScanner<'_> {
        TriggerScanner { vocabulary: self }
    }
}

impl Default for TriggerVocabulary {
    fn default() -> Self {
        let terms = DEFAULT_TRIGGER_TERMS
            .iter()
            .map(|t| NonEmptyText::new(t).expect("default trigger terms are non-empty"))
            .collect::<Vec<_>>();
        let folded = terms.iter().map(|t| t.as_str().to_lowercase()).collect();
        Self { terms, folded }
    }
}

/// Distinct triggers found in a set of notes, in vocabulary order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TriggerSet(Vec<NonEmptyText>);

impl TriggerSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `term` was found. Compared exactly against the vocabulary spelling.
    pub fn contains(&self, term: &str) -> bool {
        self.0.iter().any(|t| t.as_str() == term)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(NonEmptyText::as_str)
    }

    pub fn is_superset(&self, other: &TriggerSet) -> bool {
        other.iter().all(|t| self.contains(t))
    }
}

/// Scans note text against a [`TriggerVocabulary`].
#[derive(Clone, Copy, Debug)]
pub struct TriggerScanner<'v> {
    vocabulary: &'v TriggerVocabulary,
}

impl TriggerScanner<'_> {
    /// Triggers found in the content of `notes`. No notes gives an empty set.
    pub fn scan<'n, I>(&self, notes: I) -> TriggerSet
    where
        I: IntoIterator<Item = &'n ClinicalNote>,
    {
        self.scan_texts(notes.into_iter().map(|n| n.content.as_str()))
    }

    /// Triggers found in arbitrary text fragments, joined in order as one document.
    ///
    /// Empty fragments are skipped and add no separator.
    pub fn scan_texts<'t, I>(&self, texts: I) -> TriggerSet
    where
        I: IntoIterator<Item = &'t str>,
    {
        let mut content = String::new();
        for text in texts.into_iter().filter(|t| !t.is_empty()) {
            if !content.is_empty() {
                content.push(' ');
            }
            content.push_str(&text.to_lowercase());
        }

        let mut found = Vec::new();
        if content.trim().is_empty() {
            return TriggerSet(found);
        }
        for (term, folded) in self.vocabulary.terms.iter().zip(&self.vocabulary.folded) {
            if content.contains(folded.as_str()) {
                found.push(term.clone());
            }
        }
        TriggerSet(found)
    }
}

/// Scan `notes` against `vocabulary`.
pub fn scan<'n, I>(notes: I, vocabulary: &TriggerVocabulary) -> TriggerSet
where
    I: IntoIterator<Item = &'n ClinicalNote>,
{
    vocabulary.scanner().scan(notes)
}
