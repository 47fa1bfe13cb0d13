//! Consumer side of the answer stream.
//!
//! [`AnswerClient::answer_stream`] posts a question and yields [`StreamEvent`]s as
//! frames arrive. Frames may be split anywhere by the transport, including inside a
//! multi-byte character, so bytes are buffered until a full `\n\n`-terminated frame
//! is available.

use futures::{Stream, StreamExt};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;

use crate::agents::{AgentsListResponse, AnswerResponse, QuestionRequest, StreamEvent};
use crate::error::{AppError, ErrorCode, ErrorResponse, Result};

const FRAME_DELIMITER: &[u8] = b"\n\n";
const DATA_PREFIX: &str = "data: ";

/// Upper bound on one unterminated frame. Larger fragments are discarded.
pub const MAX_FRAME_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// FRAME DECODER
// ============================================================================

/// Incremental `data: <json>\n\n` decoder.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `bytes` and returns every event completed by them. Parsed frames are
    /// drained; only the unterminated tail stays buffered.
    ///
    /// The tail was already searched, so scanning resumes just before the new bytes.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        let mut from = self.buffer.len().saturating_sub(FRAME_DELIMITER.len() - 1);
        self.buffer.extend_from_slice(bytes);

        let mut events = vec![];
        while let Some(end) = find_delimiter(&self.buffer, from) {
            let frame: Vec<u8> = self.buffer.drain(..end + FRAME_DELIMITER.len()).collect();
            events.extend(parse_frame(&frame[..end]));
            from = 0;
        }

        if self.buffer.len() > MAX_FRAME_BYTES {
            log::warn!(
                "⚠️  Discarding {} buffered bytes with no frame delimiter",
                self.buffer.len()
            );
            self.buffer.clear();
        }
        events
    }

    /// Flushes a trailing frame that arrived without its delimiter.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let rest = std::mem::take(&mut self.buffer);
        if rest.iter().all(u8::is_ascii_whitespace) {
            return vec![];
        }
        parse_frame(&rest)
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn find_delimiter(buffer: &[u8], from: usize) -> Option<usize> {
    buffer
        .get(from..)?
        .windows(FRAME_DELIMITER.len())
        .position(|window| window == FRAME_DELIMITER)
        .map(|pos| pos + from)
}

fn parse_frame(frame: &[u8]) -> Vec<StreamEvent> {
    let text = match std::str::from_utf8(frame) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("⚠️  Dropping frame with invalid UTF-8: {}", e);
            return vec![];
        }
    };

    text.lines()
        .filter_map(|line| line.strip_prefix(DATA_PREFIX))
        .filter_map(|data| match serde_json::from_str::<StreamEvent>(data) {
            Ok(event) => Some(event),
            Err(e) => {
                log::warn!("⚠️  Dropping malformed event ({}): {}", e, data);
                None
            }
        })
        .collect()
}

// ============================================================================
// HTTP CLIENT
// ============================================================================

#[derive(Debug, Clone)]
pub struct AnswerClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnswerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Each call opens its own connection. Dropping the stream closes it.
    ///
    /// Ends after the first `complete` or `error` event. Yields a single `Err` and
    /// ends on transport failure or a non-2xx status.
    pub fn answer_stream(
        &self,
        request: &QuestionRequest,
    ) -> impl Stream<Item = Result<StreamEvent>> + Send + 'static {
        let http = self.http.clone();
        let url = self.url("/api/agents/answer-stream");
        let body = request.clone();

        async_stream::stream! {
            let response = match http
                .post(&url)
                .header(ACCEPT, "text/event-stream")
                .json(&body)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    yield Err(AppError::from(e));
                    return;
                }
            };

            if !response.status().is_success() {
                yield Err(status_error(response).await);
                return;
            }

            let mut decoder = FrameDecoder::new();
            let mut bytes = Box::pin(response.bytes_stream());
            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => {
                        for event in decoder.push(&chunk) {
                            let terminal = event.is_terminal();
                            yield Ok(event);
                            if terminal {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(AppError::from(e));
                        return;
                    }
                }
            }

            for event in decoder.finish() {
                let terminal = event.is_terminal();
                yield Ok(event);
                if terminal {
                    return;
                }
            }
        }
    }

    /// Non-streaming variant of [`Self::answer_stream`].
    pub async fn answer(&self, request: &QuestionRequest) -> Result<AnswerResponse> {
        let response = self
            .http
            .post(self.url("/api/agents/answer"))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(response.json().await?)
    }

    pub async fn available_agents(&self) -> Result<AgentsListResponse> {
        let response = self.http.get(self.url("/api/agents/available")).send().await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(response.json().await?)
    }
}

async fn status_error(response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.detail)
        .unwrap_or(body);

    AppError::new(
        code_for_status(status),
        format!("Server responded with {}: {}", status, detail),
    )
}

fn code_for_status(status: StatusCode) -> ErrorCode {
    match status {
        StatusCode::BAD_REQUEST => ErrorCode::ValidationError,
        StatusCode::NOT_FOUND => ErrorCode::NotFound,
        StatusCode::CONFLICT => ErrorCode::Conflict,
        s if s.is_client_error() => ErrorCode::BadRequest,
        _ => ErrorCode::ExternalServiceError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{EventPayload, EventType};
    use crate::handlers::create_app_router;
    use crate::init::testing::test_state;
    use crate::llm::testing::ScriptedLlm;
    use std::sync::Arc;

    const START: &str = r#"data: {"event_type":"start","timestamp":"2024-01-01T00:00:00Z","data":{"message":"Processing question...","question":"q"}}"#;
    const COMPLETE: &str = r#"data: {"event_type":"complete","timestamp":"2024-01-01T00:00:01Z","data":{"message":"Processing complete","agent_used":"technical","success":true}}"#;

    #[test]
    fn test_frame_split_across_deliveries() {
        let mut decoder = FrameDecoder::new();
        let wire = format!("{}\n\n{}\n\n", START, COMPLETE);
        let split = START.len() + 4;

        let first = decoder.push(wire[..split].as_bytes());
        let second = decoder.push(wire[split..].as_bytes());

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].event_type(), EventType::Start);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].event_type(), EventType::Complete);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_split_inside_multibyte_character() {
        let frame = r#"data: {"event_type":"content","timestamp":"t","data":{"chunk":"naïve 🚀","is_final":true}}"#;
        let wire = format!("{}\n\n", frame);
        let bytes = wire.as_bytes();
        let rocket = wire.find('🚀').unwrap();

        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(&bytes[..rocket + 2]).is_empty());
        let events = decoder.push(&bytes[rocket + 2..]);

        match &events[0].payload {
            EventPayload::Content { chunk, .. } => assert_eq!(chunk, "naïve 🚀"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_malformed_frame_dropped() {
        let mut decoder = FrameDecoder::new();
        let wire = format!("data: {{not json\n\n: keep-alive\n\n{}\n\n", COMPLETE);

        let events = decoder.push(wire.as_bytes());

        assert_eq!(events.len(), 1);
        assert!(events[0].is_terminal());
    }

    #[test]
    fn test_finish_flushes_trailing_frame() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(COMPLETE.as_bytes()).is_empty());
        assert_eq!(decoder.finish().len(), 1);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_finish_drops_incomplete_fragment() {
        let mut decoder = FrameDecoder::new();
        decoder.push(&START.as_bytes()[..40]);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_frame_delivered_byte_by_byte() {
        let wire = format!("{}\n\n{}\n\n", START, COMPLETE);
        let mut decoder = FrameDecoder::new();

        let mut events = vec![];
        for byte in wire.as_bytes() {
            events.extend(decoder.push(std::slice::from_ref(byte)));
        }

        let types: Vec<EventType> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(types, vec![EventType::Start, EventType::Complete]);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_delimiter_split_between_deliveries() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(format!("{}\n", START).as_bytes()).is_empty());

        let events = decoder.push(b"\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), EventType::Start);
    }

    #[test]
    fn test_oversized_fragment_discarded() {
        let mut decoder = FrameDecoder::new();
        let junk = vec![b'x'; MAX_FRAME_BYTES + 1];

        assert!(decoder.push(&junk).is_empty());
        assert_eq!(decoder.pending(), 0);

        let events = decoder.push(format!("\n\n{}\n\n", COMPLETE).as_bytes());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), EventType::Complete);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(code_for_status(StatusCode::BAD_REQUEST), ErrorCode::ValidationError);
        assert_eq!(code_for_status(StatusCode::UNPROCESSABLE_ENTITY), ErrorCode::BadRequest);
        assert_eq!(code_for_status(StatusCode::BAD_GATEWAY), ErrorCode::ExternalServiceError);
    }

    async fn spawn_server(answer: &str) -> String {
        serve(ScriptedLlm::answering(answer).when("follow-up questions", Ok(r#"["Next?"]"#))).await
    }

    async fn serve(llm: ScriptedLlm) -> String {
        let app = create_app_router(test_state(Arc::new(llm)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn collect(client: &AnswerClient, question: &str) -> Vec<Result<StreamEvent>> {
        client
            .answer_stream(&QuestionRequest::new(question))
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_end_to_end_stream() {
        let answer = "A B-tree keeps keys sorted in wide nodes. Lookups are O(log n).";
        let client = AnswerClient::new(spawn_server(answer).await);

        let items = collect(&client, "Explain how a B-tree works").await;
        let events: Vec<StreamEvent> = items.into_iter().map(|item| item.unwrap()).collect();

        assert_eq!(events.first().map(|e| e.event_type()), Some(EventType::Start));
        assert_eq!(events.last().map(|e| e.event_type()), Some(EventType::Complete));
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);

        assert_eq!(streamed_answer(&events), answer);
    }

    fn streamed_answer(events: &[StreamEvent]) -> String {
        events
            .iter()
            .filter_map(|e| match &e.payload {
                EventPayload::Content { chunk, .. } => Some(chunk.as_str()),
                _ => None,
            })
            .collect()
    }

    fn assert_well_formed(events: &[StreamEvent], question: &str, answer: &str) {
        let starts: Vec<&str> = events
            .iter()
            .filter_map(|e| match &e.payload {
                EventPayload::Start { question, .. } => Some(question.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec![question]);
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
        assert_eq!(events.last().map(|e| e.event_type()), Some(EventType::Complete));

        let finals: Vec<bool> = events
            .iter()
            .filter_map(|e| match &e.payload {
                EventPayload::Content { is_final, .. } => Some(*is_final),
                _ => None,
            })
            .collect();
        assert!(finals.len() > 1);
        assert_eq!(finals.iter().filter(|f| **f).count(), 1);
        assert_eq!(finals.last(), Some(&true));

        let full_answer = events
            .iter()
            .find_map(|e| match &e.payload {
                EventPayload::AnswerComplete { full_answer, .. } => Some(full_answer.as_str()),
                _ => None,
            })
            .unwrap();
        assert_eq!(full_answer, answer);
        assert_eq!(streamed_answer(events), full_answer);
    }

    #[tokio::test]
    async fn test_concurrent_streams_are_independent() {
        let story = "I led a migration of our billing service and shipped it in six weeks.";
        let btree = "A B-tree keeps keys sorted in wide nodes so lookups stay O(log n).";
        let llm = ScriptedLlm::answering(btree)
            .when("follow-up questions", Ok(r#"["Next?"]"#))
            .when("STAR method", Ok(story));
        let client = AnswerClient::new(serve(llm).await);

        let behavioral = "Tell me about a time you led a project";
        let technical = "Explain how a B-tree works";
        let (a, b) = tokio::join!(collect(&client, behavioral), collect(&client, technical));

        let a: Vec<StreamEvent> = a.into_iter().map(|item| item.unwrap()).collect();
        let b: Vec<StreamEvent> = b.into_iter().map(|item| item.unwrap()).collect();
        assert_well_formed(&a, behavioral, story);
        assert_well_formed(&b, technical, btree);
    }

    #[tokio::test]
    async fn test_rejected_request_yields_one_error() {
        let client = AnswerClient::new(spawn_server("unused").await);

        let items = collect(&client, "Hi").await;

        assert_eq!(items.len(), 1);
        let err = items[0].as_ref().unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("question"));
    }

    #[tokio::test]
    async fn test_transport_failure_yields_one_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = AnswerClient::new(format!("http://{}", addr));
        let items = collect(&client, "Explain how a B-tree works").await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap_err().code, ErrorCode::ExternalServiceError);
    }

    #[tokio::test]
    async fn test_sync_answer_and_agents() {
        let client = AnswerClient::new(spawn_server("Use the STAR method.").await);

        let response = client
            .answer(&QuestionRequest::new("Tell me about a time you led a project"))
            .await
            .unwrap();
        assert_eq!(response.follow_up_questions, vec!["Next?"]);

        let agents = client.available_agents().await.unwrap();
        assert_eq!(agents.total_agents, 6);
    }
}
