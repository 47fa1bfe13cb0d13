use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError, ValidationErrors};

/// Body of `/api/agents/answer` and `/api/agents/answer-stream`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QuestionRequest {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub conversation_history: Vec<HistoryEntry>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<HistoryEntry>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<HistoryEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HistoryEntry {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionLimits {
    pub min_question: usize,
    pub max_question: usize,
    pub max_context: usize,
}

impl Default for QuestionLimits {
    fn default() -> Self {
        Self {
            min_question: 5,
            max_question: 2000,
            max_context: 1000,
        }
    }
}

impl QuestionRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Lengths are counted in characters, not bytes.
    pub fn validate(&self, limits: &QuestionLimits) -> Result<()> {
        let mut errors = ValidationErrors::new();

        let question_len = self.question.trim().chars().count();
        if question_len < limits.min_question {
            errors.add(ValidationError::new(
                "question",
                format!("must be at least {} characters", limits.min_question),
            ));
        } else if question_len > limits.max_question {
            errors.add(ValidationError::new(
                "question",
                format!("must be at most {} characters", limits.max_question),
            ));
        }

        if let Some(context) = &self.context {
            if context.chars().count() > limits.max_context {
                errors.add(ValidationError::new(
                    "context",
                    format!("must be at most {} characters", limits.max_context),
                ));
            }
        }

        errors.into_result()
    }
}
