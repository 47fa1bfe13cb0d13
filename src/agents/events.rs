use serde::{Deserialize, Serialize};

use crate::agents::AgentKind;
use crate::types::{Confidence, Timestamp};

/// One frame of the answer stream: `{"event_type": ..., "data": {...}, "timestamp": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamEvent {
    #[serde(flatten)]
    pub payload: EventPayload,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event_type", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    // Lifecycle events
    Start {
        message: String,
        question: String,
    },

    // Coordinator events
    Routing {
        selected_agent: AgentKind,
        reasoning: String,
        confidence: Confidence,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        fallback: bool,
    },

    Processing {
        message: String,
        agent: AgentKind,
    },

    // Content generation events
    Content {
        chunk: String,
        is_final: bool,
    },

    AnswerComplete {
        full_answer: String,
        word_count: usize,
        character_count: usize,
        metadata: serde_json::Value,
    },

    FollowUps {
        questions: Vec<String>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        generic: bool,
    },

    // Terminal events
    Complete {
        message: String,
        agent_used: AgentKind,
        success: bool,
    },

    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    Start,
    Routing,
    Processing,
    Content,
    AnswerComplete,
    FollowUps,
    Complete,
    Error,
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Start { .. } => EventType::Start,
            Self::Routing { .. } => EventType::Routing,
            Self::Processing { .. } => EventType::Processing,
            Self::Content { .. } => EventType::Content,
            Self::AnswerComplete { .. } => EventType::AnswerComplete,
            Self::FollowUps { .. } => EventType::FollowUps,
            Self::Complete { .. } => EventType::Complete,
            Self::Error { .. } => EventType::Error,
        }
    }
}

impl StreamEvent {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            payload,
            timestamp: Timestamp::now(),
        }
    }

    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.payload,
            EventPayload::Complete { .. } | EventPayload::Error { .. }
        )
    }
}
