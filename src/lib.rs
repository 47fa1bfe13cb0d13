pub mod agents;
pub mod client;
pub mod error;
pub mod handlers;
pub mod init;
pub mod llm;
pub mod models;
pub mod tracking;
pub mod types;

pub use crate::agents::{AnswerPipeline, EventPayload, QuestionRequest, StreamEvent};
pub use crate::client::AnswerClient;
pub use crate::error::{AppError, ErrorCode, Result};
pub use crate::init::{AiConfig, AppState, Config, StreamConfig};
