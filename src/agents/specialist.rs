use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::agents::{AgentKind, AgentProfile, HistoryEntry, QuestionRequest};
use crate::llm::{LlmClient, LlmError};
use crate::types::{truncate_chars, TextStats};

const HISTORY_WINDOW: usize = 3;
const HISTORY_ANSWER_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentAnswer {
    pub agent: AgentKind,
    pub answer: String,
    pub metadata: serde_json::Value,
}

pub struct SpecialistAgent {
    llm: Arc<dyn LlmClient>,
    profile: &'static AgentProfile,
}

impl SpecialistAgent {
    pub fn new(llm: Arc<dyn LlmClient>, kind: AgentKind) -> Self {
        Self {
            llm,
            profile: kind.profile(),
        }
    }

    pub async fn execute(&self, request: &QuestionRequest) -> Result<AgentAnswer, LlmError> {
        let prompt = build_user_prompt(request);
        let answer = self.llm.complete(self.profile.system_prompt, &prompt).await?;

        Ok(AgentAnswer {
            agent: self.profile.kind,
            metadata: answer_metadata(&answer, self.llm.model_name()),
            answer,
        })
    }
}

fn build_user_prompt(request: &QuestionRequest) -> String {
    let mut prompt = format!("Interview Question: \"{}\"\n", request.question.trim());

    if let Some(context) = request.context.as_deref().filter(|c| !c.trim().is_empty()) {
        prompt.push_str(&format!("\nCandidate Context: {}\n", context));
    }

    let history = history_context(&request.conversation_history);
    if !history.is_empty() {
        prompt.push_str(&history);
    }

    prompt.push_str(
        "\nProvide a comprehensive, well-structured answer that would impress in an interview.",
    );
    prompt
}

/// Last few exchanges only, answers shortened.
fn history_context(history: &[HistoryEntry]) -> String {
    if history.is_empty() {
        return String::new();
    }

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    let mut out = String::from("\nPrevious conversation:\n");
    for (i, exchange) in history[start..].iter().enumerate() {
        out.push_str(&format!("Q{}: {}\n", i + 1, exchange.question));
        out.push_str(&format!(
            "A{}: {}...\n\n",
            i + 1,
            truncate_chars(&exchange.answer, HISTORY_ANSWER_CHARS)
        ));
    }
    out
}

fn answer_confidence(character_count: usize) -> f32 {
    match character_count {
        0..100 => 0.6,
        100..500 => 0.75,
        500..1000 => 0.85,
        _ => 0.9,
    }
}

fn answer_metadata(answer: &str, model: &str) -> serde_json::Value {
    let stats = TextStats::of(answer);
    let lower = answer.to_lowercase();
    let has_structure = ["1.", "2.", "First", "Second", "•", "- "]
        .iter()
        .any(|marker| answer.contains(marker));

    json!({
        "word_count": stats.word_count,
        "char_count": stats.character_count,
        "has_examples": lower.contains("example") || lower.contains("for instance"),
        "has_structure": has_structure,
        "confidence": answer_confidence(stats.character_count),
        "model": model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedLlm;

    fn entry(q: &str, a: &str) -> HistoryEntry {
        HistoryEntry {
            question: q.to_string(),
            answer: a.to_string(),
            agent: None,
        }
    }

    #[test]
    fn test_history_keeps_last_three() {
        let history = vec![entry("q1", "a1"), entry("q2", "a2"), entry("q3", "a3"), entry("q4", "a4")];
        let text = history_context(&history);

        assert!(!text.contains("q1"));
        assert!(text.contains("Q1: q2"));
        assert!(text.contains("Q3: q4"));
    }

    #[test]
    fn test_history_truncates_answers() {
        let long = "y".repeat(500);
        let text = history_context(&[entry("q", &long)]);
        assert!(text.contains(&format!("A1: {}...", "y".repeat(200))));
        assert!(!text.contains(&"y".repeat(201)));
    }

    #[test]
    fn test_prompt_includes_context() {
        let request = QuestionRequest::new("Explain CAP").with_context("Backend engineer");
        let prompt = build_user_prompt(&request);
        assert!(prompt.contains("Interview Question: \"Explain CAP\""));
        assert!(prompt.contains("Candidate Context: Backend engineer"));
        assert!(!prompt.contains("Previous conversation"));
    }

    #[test]
    fn test_metadata() {
        let meta = answer_metadata("1. First, for example, use a hash map.", "m");
        assert_eq!(meta["has_examples"], true);
        assert_eq!(meta["has_structure"], true);
        assert_eq!(meta["word_count"], 8);
        assert_eq!(meta["confidence"], 0.6f32 as f64);
    }

    #[test]
    fn test_confidence_buckets() {
        assert_eq!(answer_confidence(10), 0.6);
        assert_eq!(answer_confidence(100), 0.75);
        assert_eq!(answer_confidence(999), 0.85);
        assert_eq!(answer_confidence(5000), 0.9);
    }

    #[tokio::test]
    async fn test_execute_uses_profile_preamble() {
        let llm = Arc::new(
            ScriptedLlm::failing("wrong preamble").when("STAR method", Ok("Situation: ...")),
        );
        let agent = SpecialistAgent::new(llm, AgentKind::Behavioral);

        let answer = agent
            .execute(&QuestionRequest::new("Tell me about a conflict"))
            .await
            .unwrap();

        assert_eq!(answer.agent, AgentKind::Behavioral);
        assert_eq!(answer.answer, "Situation: ...");
    }

    #[tokio::test]
    async fn test_execute_propagates_failure() {
        let agent = SpecialistAgent::new(Arc::new(ScriptedLlm::failing("timeout")), AgentKind::Coding);
        let err = agent.execute(&QuestionRequest::new("Write a parser")).await.unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }
}
