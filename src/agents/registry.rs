use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::agents::prompts;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgentKind {
    ProductManager,
    #[default]
    Technical,
    Architect,
    Coding,
    Behavioral,
    SystemDesign,
}

/// Static description of one specialist.
#[derive(Debug)]
pub struct AgentProfile {
    pub kind: AgentKind,
    pub system_prompt: &'static str,
    pub specializations: &'static [&'static str],
    pub best_for: &'static [&'static str],
    pub generic_follow_ups: [&'static str; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentInfo {
    pub id: AgentKind,
    pub name: String,
    pub specializations: Vec<String>,
    pub best_for: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentsListResponse {
    pub total_agents: usize,
    pub agents: Vec<AgentInfo>,
}

impl AgentKind {
    pub fn profile(self) -> &'static AgentProfile {
        match self {
            Self::ProductManager => &PRODUCT_MANAGER,
            Self::Technical => &TECHNICAL,
            Self::Architect => &ARCHITECT,
            Self::Coding => &CODING,
            Self::Behavioral => &BEHAVIORAL,
            Self::SystemDesign => &SYSTEM_DESIGN,
        }
    }

    /// `system_design` -> `System Design`.
    pub fn display_name(self) -> String {
        self.as_ref()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn info(self) -> AgentInfo {
        let profile = self.profile();
        AgentInfo {
            id: self,
            name: self.display_name(),
            specializations: profile.specializations.iter().map(|s| s.to_string()).collect(),
            best_for: profile.best_for.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub fn available_agents() -> AgentsListResponse {
    let agents: Vec<AgentInfo> = AgentKind::iter().map(AgentKind::info).collect();
    AgentsListResponse {
        total_agents: agents.len(),
        agents,
    }
}

/// Used when no specialist-specific list applies.
pub const DEFAULT_FOLLOW_UPS: [&str; 3] = [
    "Can you elaborate on that approach?",
    "What alternatives did you consider?",
    "How would you validate this solution?",
];

// ============================================================================
// Profiles
// ============================================================================

static PRODUCT_MANAGER: AgentProfile = AgentProfile {
    kind: AgentKind::ProductManager,
    system_prompt: prompts::PRODUCT_MANAGER,
    specializations: &[
        "Product Strategy",
        "Prioritization Frameworks (RICE, ICE, Kano)",
        "Metrics (AARRR, HEART)",
        "User Research",
        "Roadmap Planning",
        "Stakeholder Management",
    ],
    best_for: &[
        "Product strategy questions",
        "Feature prioritization",
        "Metric definition",
        "User research approaches",
        "PM framework application",
    ],
    generic_follow_ups: [
        "How would you measure the success of this approach?",
        "What trade-offs would you consider?",
        "How would you prioritize if resources were limited?",
    ],
};

static TECHNICAL: AgentProfile = AgentProfile {
    kind: AgentKind::Technical,
    system_prompt: prompts::TECHNICAL,
    specializations: &[
        "Algorithms and Data Structures",
        "Complexity Analysis (Big O)",
        "Design Patterns",
        "Software Engineering Principles",
        "Code Optimization",
        "Debugging Techniques",
    ],
    best_for: &[
        "Algorithm explanations",
        "Data structure questions",
        "Complexity analysis",
        "Design pattern discussions",
        "Technical concept clarification",
    ],
    generic_follow_ups: [
        "Can you explain the time complexity?",
        "How would you handle edge cases?",
        "What are alternative approaches?",
    ],
};

static ARCHITECT: AgentProfile = AgentProfile {
    kind: AgentKind::Architect,
    system_prompt: prompts::ARCHITECT,
    specializations: &[
        "System Architecture Design",
        "Microservices Architecture",
        "Scalability and Performance",
        "High Availability",
        "Database Design",
        "Cloud Architecture (AWS, GCP, Azure)",
    ],
    best_for: &[
        "Architecture design questions",
        "Scalability discussions",
        "Infrastructure planning",
        "Cloud architecture",
        "High-level system design",
    ],
    generic_follow_ups: [
        "How would you scale this to millions of users?",
        "What failure scenarios should we consider?",
        "What are the cost implications?",
    ],
};

static CODING: AgentProfile = AgentProfile {
    kind: AgentKind::Coding,
    system_prompt: prompts::CODING,
    specializations: &[
        "Clean Code Principles",
        "Multiple Programming Languages",
        "Test-Driven Development",
        "Code Review",
        "Performance Optimization",
        "Error Handling",
    ],
    best_for: &[
        "Code implementation",
        "Algorithm coding",
        "Code review and refactoring",
        "Best practices guidance",
        "Performance optimization",
    ],
    generic_follow_ups: [
        "How would you test this code?",
        "What edge cases need to be handled?",
        "How could this be optimized?",
    ],
};

static BEHAVIORAL: AgentProfile = AgentProfile {
    kind: AgentKind::Behavioral,
    system_prompt: prompts::BEHAVIORAL,
    specializations: &[
        "STAR Method",
        "Leadership and Management",
        "Conflict Resolution",
        "Communication Skills",
        "Team Building",
        "Problem-Solving",
    ],
    best_for: &[
        "Behavioral interview questions",
        "Leadership scenarios",
        "Conflict resolution stories",
        "Team management questions",
        "Communication challenges",
    ],
    generic_follow_ups: [
        "What did you learn from this experience?",
        "How would you handle it differently now?",
        "What was the biggest challenge?",
    ],
};

static SYSTEM_DESIGN: AgentProfile = AgentProfile {
    kind: AgentKind::SystemDesign,
    system_prompt: prompts::SYSTEM_DESIGN,
    specializations: &[
        "Distributed Systems Design",
        "Scalability Patterns",
        "CAP Theorem Trade-offs",
        "Database Selection",
        "Caching Strategies",
        "Microservices Architecture",
    ],
    best_for: &[
        "Design Twitter/Instagram/Uber",
        "URL shortener design",
        "Distributed system questions",
        "Scalability challenges",
        "Trade-off discussions",
    ],
    generic_follow_ups: [
        "How would you handle data consistency?",
        "What caching strategy would you use?",
        "How would you monitor this system?",
    ],
};
