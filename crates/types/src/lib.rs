//! Shared primitive types for MediLabo.
//!
//! These are the small validated value types that every other crate agrees on:
//! [`NonEmptyText`] for free text that must carry content (vocabulary terms, names) and
//! [`Gender`] for the binary gender used by the risk rules.

use std::fmt;

/// Errors that can occur when creating validated primitive types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// The input did not name a recognised gender
    #[error("unrecognised gender: '{0}'")]
    UnrecognisedGender(String),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction, so
/// `"  Poids "` and `"Poids"` produce equal values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

/// Patient gender as used by the risk decision table.
///
/// Only the two values the rule set distinguishes exist. Anything else is rejected at
/// parse time rather than mapped onto one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Single-letter code used in patient records (`M` / `F`).
    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }

    /// Parse a gender from a record value.
    ///
    /// Accepts the record codes `M` / `F`, the English words and the French labels shown
    /// on patient screens, all case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::UnrecognisedGender`] for any other value, including blank input.
    pub fn parse(input: &str) -> Result<Self, TextError> {
        match input.trim().to_lowercase().as_str() {
            "m" | "male" | "masculin" => Ok(Gender::Male),
            "f" | "female" | "féminin" | "feminin" => Ok(Gender::Female),
            _ => Err(TextError::UnrecognisedGender(input.to_owned())),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl serde::Serialize for Gender {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

impl<'de> serde::Deserialize<'de> for Gender {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Gender::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Poids \n").expect("valid text");
        assert_eq!(text.as_str(), "Poids");
    }

    #[test]
    fn non_empty_text_rejects_blank_input() {
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
        assert_eq!(NonEmptyText::new(""), Err(TextError::Empty));
    }

    #[test]
    fn non_empty_text_serialises_as_plain_string() {
        let text = NonEmptyText::new("Cholestérol").expect("valid text");
        assert_eq!(serde_json::to_string(&text).expect("serialise"), "\"Cholestérol\"");
        assert_eq!(text.to_string(), "Cholestérol");
        assert_eq!(text.into_inner(), "Cholestérol");
    }

    #[test]
    fn gender_accepts_codes_and_labels() {
        assert_eq!(Gender::parse("M"), Ok(Gender::Male));
        assert_eq!(Gender::parse("f"), Ok(Gender::Female));
        assert_eq!(Gender::parse("Female"), Ok(Gender::Female));
        assert_eq!(Gender::parse("Masculin"), Ok(Gender::Male));
        assert_eq!(Gender::parse(" FÉMININ "), Ok(Gender::Female));
    }

    #[test]
    fn gender_rejects_unknown_values() {
        assert_eq!(
            Gender::parse("X"),
            Err(TextError::UnrecognisedGender("X".into()))
        );
        assert!(Gender::parse("").is_err());
    }

    #[test]
    fn gender_serialises_as_code() {
        let json = serde_json::to_string(&Gender::Female).expect("serialise");
        assert_eq!(json, "\"F\"");
        let parsed: Gender = serde_json::from_str("\"male\"").expect("deserialise");
        assert_eq!(parsed, Gender::Male);
    }
}
