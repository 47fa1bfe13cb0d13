use std::sync::Arc;

use aho_corasick::BuildError;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::agents::{
    AgentKind, EventPayload, EventType, FollowUpGenerator, QuestionLimits, QuestionRequest,
    RoutingMode, SpecialistAgent, StreamEvent, Supervisor,
};
use crate::error::{AppError, Result};
use crate::init::StreamConfig;
use crate::llm::LlmClient;
use crate::types::{Confidence, TextStats, Timestamp};

const CHANNEL_CAPACITY: usize = 100;

// ============================================================================
// PRODUCER PHASES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Routed,
    Processing,
    /// At least one content chunk sent.
    Streaming,
    Answered,
    FollowedUp,
    Completed,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed)
    }
}

/// Phase reached by emitting `event` from `current`, or `None` when the event is out of order.
/// `current == None` means nothing has been emitted yet.
fn next_phase(current: Option<Phase>, event: EventType) -> Option<Phase> {
    use EventType as E;
    use Phase as P;

    match (current, event) {
        (Some(phase), _) if phase.is_terminal() => None,
        (_, E::Error) => Some(P::Failed),
        (None, E::Start) => Some(P::Start),
        (Some(P::Start), E::Routing) => Some(P::Routed),
        (Some(P::Routed), E::Processing) => Some(P::Processing),
        (Some(P::Processing | P::Streaming), E::Content) => Some(P::Streaming),
        (Some(P::Processing | P::Streaming), E::AnswerComplete) => Some(P::Answered),
        (Some(P::Answered), E::FollowUps) => Some(P::FollowedUp),
        (Some(P::FollowedUp), E::Complete) => Some(P::Completed),
        _ => None,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum EmitError {
    /// The receiving side went away.
    Closed,
    OutOfOrder(EventType),
}

/// Sends events in phase order and guarantees a single terminal event.
struct Emitter {
    tx: mpsc::Sender<StreamEvent>,
    phase: Option<Phase>,
}

impl Emitter {
    fn new(tx: mpsc::Sender<StreamEvent>) -> Self {
        Self { tx, phase: None }
    }

    async fn emit(&mut self, payload: EventPayload) -> std::result::Result<(), EmitError> {
        let event_type = payload.event_type();
        let Some(next) = next_phase(self.phase, event_type) else {
            log::error!("❌ Dropping out-of-order '{}' event (phase {:?})", event_type, self.phase);
            return Err(EmitError::OutOfOrder(event_type));
        };

        self.tx
            .send(StreamEvent::new(payload))
            .await
            .map_err(|_| EmitError::Closed)?;
        self.phase = Some(next);
        Ok(())
    }
}

// ============================================================================
// SYNCHRONOUS RESPONSE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutingSummary {
    pub selected_agent: AgentKind,
    pub reasoning: String,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub success: bool,
    pub timestamp: Timestamp,
    pub question: String,
    pub routing: RoutingSummary,
    pub answer: String,
    pub metadata: serde_json::Value,
    pub follow_up_questions: Vec<String>,
    pub statistics: TextStats,
}

// ============================================================================
// ANSWER PIPELINE
// ============================================================================

pub struct AnswerPipeline {
    llm: Arc<dyn LlmClient>,
    supervisor: Supervisor,
    follow_ups: FollowUpGenerator,
    config: StreamConfig,
}

impl AnswerPipeline {
    pub fn new(llm: Arc<dyn LlmClient>, config: StreamConfig) -> std::result::Result<Self, BuildError> {
        Ok(Self {
            supervisor: Supervisor::new(llm.clone(), config.routing_mode)?,
            follow_ups: FollowUpGenerator::new(llm.clone()),
            llm,
            config,
        })
    }

    pub fn limits(&self) -> &QuestionLimits {
        &self.config.limits
    }

    pub fn routing_mode(&self) -> RoutingMode {
        self.supervisor.mode()
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Spawns the producer and hands back its receiving end. Dropping the receiver
    /// stops the producer at its next send.
    pub fn stream(self: Arc<Self>, request: QuestionRequest) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let request_id = Uuid::now_v7();
            log::debug!("▶️  Answer stream {} started", request_id);

            let mut emitter = Emitter::new(tx);
            match self.produce(&request, &mut emitter).await {
                Ok(()) => log::debug!("⏹️  Answer stream {} finished", request_id),
                Err(EmitError::Closed) => {
                    log::info!("🔌 Client disconnected, stopping answer stream {}", request_id);
                }
                Err(EmitError::OutOfOrder(event_type)) => {
                    log::error!("❌ Answer stream {} aborted on '{}' event", request_id, event_type);
                }
            }
        });

        rx
    }

    async fn produce(
        &self,
        request: &QuestionRequest,
        emitter: &mut Emitter,
    ) -> std::result::Result<(), EmitError> {
        emitter
            .emit(EventPayload::Start {
                message: "Processing question...".to_string(),
                question: request.question.clone(),
            })
            .await?;

        let routing = self.supervisor.route(request).await;
        let agent = routing.selected_agent;
        log::info!("🧭 Routed to {} ({})", agent, routing.confidence);

        emitter
            .emit(EventPayload::Routing {
                selected_agent: agent,
                reasoning: routing.reasoning,
                confidence: routing.confidence,
                fallback: routing.fallback,
            })
            .await?;

        emitter
            .emit(EventPayload::Processing {
                message: format!("Processing with {} agent...", agent.display_name()),
                agent,
            })
            .await?;

        let answer = match SpecialistAgent::new(self.llm.clone(), agent).execute(request).await {
            Ok(answer) => answer,
            Err(e) => {
                log::error!("❌ Answer generation failed: {}", e);
                return emitter
                    .emit(EventPayload::Error {
                        message: format!("Answer generation failed: {}", e),
                    })
                    .await;
            }
        };

        let chunks = chunk_answer(&answer.answer, self.config.chunk_size);
        let last = chunks.len().saturating_sub(1);
        for (i, chunk) in chunks.into_iter().enumerate() {
            if i > 0 && !self.config.chunk_delay.is_zero() {
                tokio::time::sleep(self.config.chunk_delay).await;
            }
            emitter
                .emit(EventPayload::Content {
                    chunk,
                    is_final: i == last,
                })
                .await?;
        }

        let stats = TextStats::of(&answer.answer);
        emitter
            .emit(EventPayload::AnswerComplete {
                full_answer: answer.answer.clone(),
                word_count: stats.word_count,
                character_count: stats.character_count,
                metadata: answer.metadata,
            })
            .await?;

        let follow_ups = self
            .follow_ups
            .suggest(&request.question, &answer.answer, agent)
            .await;

        emitter
            .emit(EventPayload::FollowUps {
                questions: follow_ups.questions,
                generic: follow_ups.generic,
            })
            .await?;

        emitter
            .emit(EventPayload::Complete {
                message: "Processing complete".to_string(),
                agent_used: agent,
                success: true,
            })
            .await
    }

    pub async fn answer(&self, request: &QuestionRequest) -> Result<AnswerResponse> {
        let routing = self.supervisor.route(request).await;
        let agent = routing.selected_agent;

        let answer = SpecialistAgent::new(self.llm.clone(), agent)
            .execute(request)
            .await
            .map_err(|e| AppError::internal(format!("Error processing question: {}", e)))?;

        let follow_ups = self
            .follow_ups
            .suggest(&request.question, &answer.answer, agent)
            .await;

        Ok(AnswerResponse {
            success: true,
            timestamp: Timestamp::now(),
            question: request.question.clone(),
            routing: RoutingSummary {
                selected_agent: agent,
                reasoning: routing.reasoning,
                confidence: routing.confidence,
            },
            statistics: TextStats::of(&answer.answer),
            answer: answer.answer,
            metadata: answer.metadata,
            follow_up_questions: follow_ups.questions,
        })
    }
}

/// Splits on character boundaries, `size` characters per chunk.
pub fn chunk_answer(text: &str, size: usize) -> Vec<String> {
    text.chars()
        .collect::<Vec<_>>()
        .chunks(size.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}
