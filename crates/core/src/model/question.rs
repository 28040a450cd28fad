use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── OPTION LABEL ──────────────────────────────────────────────────────────────
//

/// Label of one of the four multiple-choice options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    /// All labels in display order.
    pub const ALL: [OptionLabel; 4] = [Self::A, Self::B, Self::C, Self::D];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionLabel {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "C" | "c" => Ok(Self::C),
            "D" | "d" => Ok(Self::D),
            other => Err(QuestionError::InvalidLabel(other.to_owned())),
        }
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id must not be blank")]
    MissingId,
    #[error("question {id}: prompt must not be blank")]
    EmptyPrompt { id: String },
    #[error("question {id}: expected options A, B, C, D in order")]
    InvalidOptions { id: String },
    #[error("question {id}: option {label} has no text")]
    EmptyOption { id: String, label: OptionLabel },
    #[error("invalid option label: {0:?}")]
    InvalidLabel(String),
}

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub label: OptionLabel,
    pub text: String,
}

/// Question as it appears in a bank asset, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub id: String,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
    pub correct_label: OptionLabel,
    pub source_reference: String,
    #[serde(default)]
    pub verse_text: Option<String>,
    #[serde(default)]
    pub explanation: String,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the id or prompt is blank, or the options
    /// are not exactly A–D in order with non-blank text.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let id = QuestionId::new(self.id).map_err(|_| QuestionError::MissingId)?;

        let prompt = self.prompt.trim().to_owned();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt {
                id: id.to_string(),
            });
        }

        let labels_in_order = self.options.len() == OptionLabel::ALL.len()
            && self
                .options
                .iter()
                .zip(OptionLabel::ALL)
                .all(|(option, label)| option.label == label);
        if !labels_in_order {
            return Err(QuestionError::InvalidOptions {
                id: id.to_string(),
            });
        }

        let mut options = Vec::with_capacity(self.options.len());
        for option in self.options {
            let text = option.text.trim().to_owned();
            if text.is_empty() {
                return Err(QuestionError::EmptyOption {
                    id: id.to_string(),
                    label: option.label,
                });
            }
            options.push(AnswerOption {
                label: option.label,
                text,
            });
        }

        let cached_verse_text = self
            .verse_text
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());

        Ok(Question {
            id,
            prompt,
            options,
            correct_label: self.correct_label,
            source_reference: self.source_reference.trim().to_owned(),
            cached_verse_text,
            explanation: self.explanation.trim().to_owned(),
        })
    }
}

/// A validated multiple-choice question.
///
/// Everything except the cached verse text is fixed once the bank is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<AnswerOption>,
    correct_label: OptionLabel,
    source_reference: String,
    cached_verse_text: Option<String>,
    explanation: String,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    #[must_use]
    pub fn correct_label(&self) -> OptionLabel {
        self.correct_label
    }

    #[must_use]
    pub fn source_reference(&self) -> &str {
        &self.source_reference
    }

    #[must_use]
    pub fn cached_verse_text(&self) -> Option<&str> {
        self.cached_verse_text.as_deref()
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn is_correct(&self, label: OptionLabel) -> bool {
        self.correct_label == label
    }

    /// Text of the option carrying `label`.
    #[must_use]
    pub fn option_text(&self, label: OptionLabel) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.label == label)
            .map(|option| option.text.as_str())
    }

    /// Cache fetched verse text on this copy of the question.
    ///
    /// Blank text is ignored so a failed lookup leaves the cache empty.
    pub fn cache_verse_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        let text = text.trim();
        if !text.is_empty() {
            self.cached_verse_text = Some(text.to_owned());
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn options(texts: [&str; 4]) -> Vec<AnswerOption> {
        OptionLabel::ALL
            .into_iter()
            .zip(texts)
            .map(|(label, text)| AnswerOption {
                label,
                text: text.to_owned(),
            })
            .collect()
    }

    fn draft() -> QuestionDraft {
        QuestionDraft {
            id: "gen-1".into(),
            prompt: "Who built the ark?".into(),
            options: options(["Moses", "Noah", "Abraham", "David"]),
            correct_label: OptionLabel::B,
            source_reference: "Genesis 6:14".into(),
            verse_text: None,
            explanation: "God told Noah to make an ark of gopher wood.".into(),
        }
    }

    #[test]
    fn valid_draft_becomes_question() {
        let q = draft().validate().unwrap();
        assert_eq!(q.id().as_str(), "gen-1");
        assert!(q.is_correct(OptionLabel::B));
        assert!(!q.is_correct(OptionLabel::A));
        assert_eq!(q.option_text(OptionLabel::B), Some("Noah"));
        assert_eq!(q.cached_verse_text(), None);
    }

    #[test]
    fn blank_prompt_is_rejected() {
        let mut d = draft();
        d.prompt = "  ".into();
        assert!(matches!(d.validate(), Err(QuestionError::EmptyPrompt { .. })));
    }

    #[test]
    fn options_must_be_a_through_d_in_order() {
        let mut d = draft();
        d.options.swap(0, 1);
        assert!(matches!(d.validate(), Err(QuestionError::InvalidOptions { .. })));

        let mut d = draft();
        d.options.pop();
        assert!(matches!(d.validate(), Err(QuestionError::InvalidOptions { .. })));
    }

    #[test]
    fn blank_option_text_is_rejected() {
        let mut d = draft();
        d.options[2].text = String::new();
        assert_eq!(
            d.validate(),
            Err(QuestionError::EmptyOption {
                id: "gen-1".into(),
                label: OptionLabel::C
            })
        );
    }

    #[test]
    fn blank_verse_text_is_not_cached() {
        let mut q = draft().validate().unwrap();
        q.cache_verse_text("   ");
        assert_eq!(q.cached_verse_text(), None);
        q.cache_verse_text(" Make thee an ark of gopher wood ");
        assert_eq!(q.cached_verse_text(), Some("Make thee an ark of gopher wood"));
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!("c".parse::<OptionLabel>().unwrap(), OptionLabel::C);
        assert!("E".parse::<OptionLabel>().is_err());
    }

    #[test]
    fn draft_reads_camel_case_json() {
        let json = r#"{
            "id": "ruth-1",
            "prompt": "Whose daughter-in-law was Ruth?",
            "options": [
                {"label": "A", "text": "Naomi"},
                {"label": "B", "text": "Sarah"},
                {"label": "C", "text": "Leah"},
                {"label": "D", "text": "Hannah"}
            ],
            "correctLabel": "A",
            "sourceReference": "Ruth 1:4"
        }"#;
        let q = serde_json::from_str::<QuestionDraft>(json)
            .unwrap()
            .validate()
            .unwrap();
        assert_eq!(q.correct_label(), OptionLabel::A);
        assert_eq!(q.explanation(), "");
    }
}
