// Public module exports
pub mod events;
pub mod follow_ups;
pub mod pipeline;
pub mod prompts;
pub mod registry;
pub mod request;
pub mod specialist;
pub mod supervisor;

// Re-export main types for convenience
pub use events::{EventPayload, EventType, StreamEvent};
pub use follow_ups::{generic_follow_ups, FollowUpGenerator, FollowUps};
pub use pipeline::{chunk_answer, AnswerPipeline, AnswerResponse, Phase, RoutingSummary};
pub use registry::{
    available_agents, AgentInfo, AgentKind, AgentProfile, AgentsListResponse, DEFAULT_FOLLOW_UPS,
};
pub use request::{HistoryEntry, QuestionLimits, QuestionRequest};
pub use specialist::{AgentAnswer, SpecialistAgent};
pub use supervisor::{KeywordRouter, RoutingDecision, RoutingMode, Supervisor};
