use std::str::FromStr;
use std::sync::Arc;

use aho_corasick::{AhoCorasick, BuildError};
use serde::{Deserialize, Serialize};

use crate::agents::{prompts, AgentKind, QuestionRequest};
use crate::llm::{extract_json_block, LlmClient, LlmError};
use crate::types::Confidence;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RoutingMode {
    /// Ask the model to classify, falling back to the default agent on failure.
    Llm,
    /// Deterministic keyword rules only.
    Keyword,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutingDecision {
    pub selected_agent: AgentKind,
    pub reasoning: String,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_agents: Vec<AgentKind>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

impl RoutingDecision {
    fn default_agent(reasoning: impl Into<String>, confidence: f32, fallback: bool) -> Self {
        Self {
            selected_agent: AgentKind::default(),
            reasoning: reasoning.into(),
            confidence: Confidence::new(confidence),
            alternative_agents: vec![],
            fallback,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModelRouting {
    selected_agent: String,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    alternative_agents: Vec<String>,
}

// ============================================================================
// SUPERVISOR
// ============================================================================

pub struct Supervisor {
    llm: Arc<dyn LlmClient>,
    mode: RoutingMode,
    keywords: KeywordRouter,
}

impl Supervisor {
    pub fn new(llm: Arc<dyn LlmClient>, mode: RoutingMode) -> Result<Self, BuildError> {
        Ok(Self {
            llm,
            mode,
            keywords: KeywordRouter::new()?,
        })
    }

    pub fn mode(&self) -> RoutingMode {
        self.mode
    }

    /// Never fails: classification problems degrade to the default agent.
    pub async fn route(&self, request: &QuestionRequest) -> RoutingDecision {
        match self.mode {
            RoutingMode::Keyword => self.keywords.classify(&request.question),
            RoutingMode::Llm => match self.route_with_model(request).await {
                Ok(decision) => decision,
                Err(e) => {
                    log::warn!("⚠️  Routing failed, using default agent: {}", e);
                    RoutingDecision::default_agent(
                        format!("Default routing due to error: {}", e),
                        0.6,
                        true,
                    )
                }
            },
        }
    }

    async fn route_with_model(&self, request: &QuestionRequest) -> Result<RoutingDecision, LlmError> {
        let mut prompt = format!(
            "Analyze this interview question and route it to the most appropriate agent.\n\nQuestion: \"{}\"\n",
            request.question
        );
        if let Some(context) = request.context.as_deref().filter(|c| !c.trim().is_empty()) {
            prompt.push_str(&format!("Candidate Context: {}\n", context));
        }
        prompt.push_str("\nDetermine the best agent to handle this question.");

        let reply = self.llm.complete(prompts::SUPERVISOR, &prompt).await?;
        parse_model_routing(&reply)
    }
}

fn parse_model_routing(reply: &str) -> Result<RoutingDecision, LlmError> {
    let raw: ModelRouting = serde_json::from_str(extract_json_block(reply))
        .map_err(|e| LlmError::Parse(e.to_string()))?;

    let Ok(selected_agent) = AgentKind::from_str(raw.selected_agent.trim()) else {
        log::warn!("⚠️  Model selected unknown agent '{}'", raw.selected_agent);
        return Ok(RoutingDecision::default_agent(
            "Default routing due to invalid agent selection",
            0.7,
            false,
        ));
    };

    Ok(RoutingDecision {
        selected_agent,
        reasoning: raw
            .reasoning
            .unwrap_or_else(|| format!("Routed to {} agent", selected_agent)),
        confidence: Confidence::new(raw.confidence.unwrap_or(0.85)),
        alternative_agents: raw
            .alternative_agents
            .iter()
            .filter_map(|a| AgentKind::from_str(a.trim()).ok())
            .filter(|a| *a != selected_agent)
            .collect(),
        fallback: false,
    })
}

// ============================================================================
// KEYWORD ROUTER
// ============================================================================

/// Rules in priority order; the first agent with any hit wins.
const RULES: &[(AgentKind, &[&str])] = &[
    (
        AgentKind::Behavioral,
        &[
            "tell me about a time",
            "describe a time",
            "describe a situation",
            "give me an example of a time",
            "how do you handle",
            "how did you handle",
            "conflict",
            "disagreement",
            "disagreed",
            "leadership",
            "teammate",
            "your greatest weakness",
        ],
    ),
    (
        AgentKind::SystemDesign,
        &[
            "design a",
            "design an",
            "distributed system",
            "url shortener",
            "url shortening",
            "rate limiter",
            "news feed",
            "messaging system",
            "capacity estimation",
        ],
    ),
    (
        AgentKind::Coding,
        &[
            "write a",
            "write code",
            "implement",
            "function",
            "code",
            "program",
            "script",
            "class",
        ],
    ),
    (
        AgentKind::ProductManager,
        &[
            "product",
            "feature",
            "features",
            "prioritize",
            "prioritization",
            "metric",
            "metrics",
            "kpi",
            "roadmap",
            "user research",
            "stakeholder",
            "north star",
        ],
    ),
    (
        AgentKind::Architect,
        &[
            "architecture",
            "design pattern",
            "microservice",
            "microservices",
            "monolith",
            "scalability",
            "infrastructure",
            "load balancer",
            "cloud",
        ],
    ),
    (
        AgentKind::Technical,
        &[
            "algorithm",
            "data structure",
            "complexity",
            "big o",
            "sort",
            "sorting",
            "quicksort",
            "binary search",
            "search",
            "tree",
            "hash",
            "array",
            "linked list",
            "graph",
            "recursion",
            "dynamic programming",
        ],
    ),
];

/// Openers that mark a whole-system design question.
const DESIGN_OPENERS: &[&str] = &["design ", "build ", "create "];

pub struct KeywordRouter {
    matcher: AhoCorasick,
    owners: Vec<(AgentKind, &'static str)>,
}

impl KeywordRouter {
    pub fn new() -> Result<Self, BuildError> {
        let owners: Vec<(AgentKind, &'static str)> = RULES
            .iter()
            .flat_map(|(kind, words)| words.iter().map(move |w| (*kind, *w)))
            .collect();
        let matcher = AhoCorasick::new(owners.iter().map(|(_, w)| *w))?;

        Ok(Self { matcher, owners })
    }

    pub fn classify(&self, question: &str) -> RoutingDecision {
        let text = question.trim().to_lowercase();
        let bytes = text.as_bytes();

        let mut hits: Vec<(AgentKind, &'static str)> = Vec::new();
        if let Some(opener) = DESIGN_OPENERS.iter().copied().find(|o| text.starts_with(o)) {
            hits.push((AgentKind::SystemDesign, opener.trim_end()));
        }
        for m in self.matcher.find_overlapping_iter(&text) {
            let before_ok = m.start() == 0 || !bytes[m.start() - 1].is_ascii_alphanumeric();
            let after_ok = m.end() == bytes.len() || !bytes[m.end()].is_ascii_alphanumeric();
            if before_ok && after_ok {
                let hit = self.owners[m.pattern().as_usize()];
                if !hits.contains(&hit) {
                    hits.push(hit);
                }
            }
        }

        for (kind, _) in RULES {
            let words: Vec<&str> = hits
                .iter()
                .filter(|(owner, _)| owner == kind)
                .map(|(_, w)| *w)
                .collect();
            if words.is_empty() {
                continue;
            }

            let confidence = (0.85 + 0.05 * (words.len() as f32 - 1.0)).min(0.95);
            let mut alternatives: Vec<AgentKind> = Vec::new();
            for (owner, _) in &hits {
                if owner != kind && !alternatives.contains(owner) {
                    alternatives.push(*owner);
                }
            }

            return RoutingDecision {
                selected_agent: *kind,
                reasoning: format!("Keyword match for {} agent: {}", kind, words.join(", ")),
                confidence: Confidence::new(confidence),
                alternative_agents: alternatives,
                fallback: false,
            };
        }

        RoutingDecision::default_agent(
            "No domain keywords matched; defaulting to technical agent",
            0.6,
            false,
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedLlm;

    fn classify(question: &str) -> RoutingDecision {
        KeywordRouter::new().unwrap().classify(question)
    }

    #[test]
    fn test_keyword_routes_canonical_questions() {
        let cases = [
            ("Tell me about a time you disagreed with your manager", AgentKind::Behavioral),
            ("Design Twitter", AgentKind::SystemDesign),
            ("How would you design a URL shortening service?", AgentKind::SystemDesign),
            ("Write a function to reverse a linked list", AgentKind::Coding),
            ("How would you prioritize features for Instagram?", AgentKind::ProductManager),
            ("Microservices vs monolith: which would you choose?", AgentKind::Architect),
            ("Explain the time complexity of quicksort", AgentKind::Technical),
        ];
        for (question, expected) in cases {
            assert_eq!(classify(question).selected_agent, expected, "{}", question);
        }
    }

    #[test]
    fn test_keyword_requires_word_boundaries() {
        // "encode" must not count as "code"
        let decision = classify("Why would you encode this value?");
        assert_eq!(decision.selected_agent, AgentKind::Technical);
        assert_eq!(decision.confidence.value(), 0.6);
    }

    #[test]
    fn test_keyword_confidence_grows_with_hits() {
        let single = classify("Explain recursion please");
        let several = classify("Explain the algorithm complexity of a hash based sort");
        assert_eq!(single.confidence.value(), 0.85);
        assert!(several.confidence.value() > single.confidence.value());
        assert!(several.confidence.value() <= 0.95);
    }

    #[test]
    fn test_parse_model_routing_with_fence() {
        let reply = "```json\n{\"selected_agent\": \"architect\", \"reasoning\": \"infra\", \"confidence\": 0.92, \"alternative_agents\": [\"system_design\"]}\n```";
        let decision = parse_model_routing(reply).unwrap();
        assert_eq!(decision.selected_agent, AgentKind::Architect);
        assert_eq!(decision.alternative_agents, vec![AgentKind::SystemDesign]);
        assert!((decision.confidence.value() - 0.92).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_model_routing_clamps_confidence() {
        let decision =
            parse_model_routing(r#"{"selected_agent":"coding","confidence":7.5}"#).unwrap();
        assert_eq!(decision.confidence.value(), 1.0);
    }

    #[test]
    fn test_parse_model_routing_unknown_agent() {
        let decision = parse_model_routing(r#"{"selected_agent":"chef"}"#).unwrap();
        assert_eq!(decision.selected_agent, AgentKind::Technical);
        assert!((decision.confidence.value() - 0.7).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_model_failure_falls_back() {
        let llm = Arc::new(ScriptedLlm::failing("connection refused"));
        let supervisor = Supervisor::new(llm, RoutingMode::Llm).unwrap();

        let decision = supervisor
            .route(&QuestionRequest::new("Explain binary search"))
            .await;

        assert_eq!(decision.selected_agent, AgentKind::Technical);
        assert!(decision.fallback);
        assert!(decision.reasoning.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_keyword_mode_skips_model() {
        let llm = Arc::new(ScriptedLlm::answering("unused"));
        let supervisor = Supervisor::new(llm.clone(), RoutingMode::Keyword).unwrap();

        let decision = supervisor.route(&QuestionRequest::new("Design Uber")).await;

        assert_eq!(decision.selected_agent, AgentKind::SystemDesign);
        assert!(llm.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_routing_mode_parse() {
        assert_eq!(RoutingMode::from_str("keyword").unwrap(), RoutingMode::Keyword);
        assert_eq!(RoutingMode::from_str("LLM").unwrap(), RoutingMode::Llm);
        assert_eq!(RoutingMode::Llm.to_string(), "llm");
    }
}
