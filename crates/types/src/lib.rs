//! # Triage Types
//!
//! Shared primitives for the triage workspace:
//! - [`NonEmptyText`] for labels that must carry content (disease names, medication names)
//! - the closed clinical vocabularies (symptoms, climatic events, risk groups, ...) that the
//!   knowledge base and the scoring engine agree on
//!
//! Every vocabulary is a plain `Copy` enum with a stable snake_case wire code. Unknown codes are
//! rejected at parse time rather than silently ignored.

mod vocabulary;

pub use vocabulary::{
    ClimateEvent, MedicalCondition, Prevalence, Region, RiskGroup, Severity, Sex, Symptom,
    UrgencyLevel, VocabularyError,
};

/// A label or medication name was blank.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("text must contain a non-whitespace character")]
    Empty,
}

/// Trimmed, never-blank text used for disease labels and medication names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyText(String);

impl NonEmptyText {
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        match input.as_ref().trim() {
            "" => Err(TextError::Empty),
            trimmed => Ok(Self(trimmed.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NonEmptyText {
    type Error = TextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyText> for String {
    fn from(text: NonEmptyText) -> Self {
        text.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_and_rejects_blank() {
        let name = NonEmptyText::new("\tDoxiciclina  ").expect("padded name");
        assert_eq!(name.to_string(), "Doxiciclina");
        assert!(matches!(NonEmptyText::new(" \n "), Err(TextError::Empty)));
    }

    #[test]
    fn test_label_wire_form_is_plain_string() {
        let label: NonEmptyText = serde_json::from_str("\" Malária \"").expect("label");
        assert_eq!(serde_json::to_string(&label).expect("serialize"), "\"Malária\"");

        let err = serde_json::from_str::<NonEmptyText>("\"\"").expect_err("empty label");
        assert!(err.to_string().contains("non-whitespace"));
    }
}
