use std::sync::Arc;

use crate::agents::{prompts, AgentKind};
use crate::llm::{extract_json_block, LlmClient, LlmError};
use crate::types::truncate_chars;

const MAX_FOLLOW_UPS: usize = 3;
const ANSWER_PREVIEW_CHARS: usize = 400;

#[derive(Debug, Clone, PartialEq)]
pub struct FollowUps {
    pub questions: Vec<String>,
    /// True when the static per-agent list was used.
    pub generic: bool,
}

pub struct FollowUpGenerator {
    llm: Arc<dyn LlmClient>,
}

impl FollowUpGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn suggest(&self, question: &str, answer: &str, agent: AgentKind) -> FollowUps {
        match self.ask_model(question, answer, agent).await {
            Ok(questions) => FollowUps {
                questions,
                generic: false,
            },
            Err(e) => {
                log::debug!("Follow-up generation fell back to generic list: {}", e);
                FollowUps {
                    questions: generic_follow_ups(agent),
                    generic: true,
                }
            }
        }
    }

    async fn ask_model(
        &self,
        question: &str,
        answer: &str,
        agent: AgentKind,
    ) -> Result<Vec<String>, LlmError> {
        let prompt = format!(
            r#"Based on this interview question and answer, suggest 3 highly relevant follow-up questions.

Original Question: {question}

Answer Summary: {summary}...

Agent Type: {agent}

Generate 3 follow-up questions that:
1. Dive deeper into the answer
2. Explore edge cases or alternatives
3. Test understanding of trade-offs

Respond with ONLY a JSON array: ["question 1", "question 2", "question 3"]"#,
            summary = truncate_chars(answer, ANSWER_PREVIEW_CHARS),
        );

        let reply = self.llm.complete(prompts::FOLLOW_UPS, &prompt).await?;
        parse_follow_ups(&reply)
    }
}

fn parse_follow_ups(reply: &str) -> Result<Vec<String>, LlmError> {
    let questions: Vec<String> = serde_json::from_str(extract_json_block(reply))
        .map_err(|e| LlmError::Parse(e.to_string()))?;

    let questions: Vec<String> = questions
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .take(MAX_FOLLOW_UPS)
        .collect();

    if questions.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(questions)
}

pub fn generic_follow_ups(agent: AgentKind) -> Vec<String> {
    agent
        .profile()
        .generic_follow_ups
        .iter()
        .map(|q| q.to_string())
        .collect()
}
