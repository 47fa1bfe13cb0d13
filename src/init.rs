use std::error::Error;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::Executor;

use crate::agents::{AnswerPipeline, QuestionLimits, RoutingMode};
use crate::error::ErrorContext;
use crate::llm::{LlmClient, OllamaLlm};

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub ai: AiConfig,
    pub stream: StreamConfig,
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub url: String,
    pub chat_model: String,
    pub temperature: f64,
}

#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub routing_mode: RoutingMode,
    pub chunk_size: usize,
    pub chunk_delay: Duration,
    pub limits: QuestionLimits,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            routing_mode: RoutingMode::Llm,
            chunk_size: 50,
            chunk_delay: Duration::from_millis(50),
            limits: QuestionLimits::default(),
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T, Box<dyn Error>>
where
    T: FromStr,
    T::Err: Error + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("Invalid value for {}: {}", key, e).into()),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL")?,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("PORT", 8000)?,
            ai: AiConfig::from_env()?,
            stream: StreamConfig::from_env()?,
        })
    }
}

impl AiConfig {
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            url: std::env::var("AI_URL").unwrap_or_else(|_| "http://127.0.0.1:11434".to_string()),
            chat_model: std::env::var("CHAT_MODEL").unwrap_or_else(|_| "llama3.2".to_string()),
            temperature: env_or("TEMPERATURE", 0.7)?,
        })
    }
}

impl StreamConfig {
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        let defaults = Self::default();
        let chunk_size: usize = env_or("STREAM_CHUNK_SIZE", defaults.chunk_size)?;
        if chunk_size == 0 {
            return Err("STREAM_CHUNK_SIZE must be greater than zero".into());
        }

        Ok(Self {
            routing_mode: env_or("ROUTING_MODE", defaults.routing_mode)?,
            chunk_size,
            chunk_delay: Duration::from_millis(env_or("STREAM_CHUNK_DELAY_MS", 50u64)?),
            limits: QuestionLimits {
                min_question: env_or("MIN_QUESTION_LENGTH", defaults.limits.min_question)?,
                max_question: env_or("MAX_QUESTION_LENGTH", defaults.limits.max_question)?,
                max_context: env_or("MAX_CONTEXT_LENGTH", defaults.limits.max_context)?,
            },
        })
    }
}

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub pipeline: Arc<AnswerPipeline>,
}

pub async fn app_init() -> Result<(Config, Arc<AppState>), Box<dyn Error>> {
    let config = Config::from_env()?;
    log::info!("✅ Configuration loaded");

    // Database
    log::info!("📊 Connecting to PostgreSQL...");
    let db = setup_database(&config).await?;
    log::info!("✅ PostgreSQL connected");

    log::info!("🔄 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("Applying interview_schema migrations")?;
    log::info!("✅ Migrations completed");

    // LLM
    log::info!("🤖 Initializing model client ({} @ {})...", config.ai.chat_model, config.ai.url);
    let llm: Arc<dyn LlmClient> = Arc::new(OllamaLlm::new(&config.ai)?);
    log::info!("✅ Model client ready, routing mode: {}", config.stream.routing_mode);

    let pipeline = Arc::new(AnswerPipeline::new(llm, config.stream.clone())?);

    let state = Arc::new(AppState { db, pipeline });
    Ok((config, state))
}

// ============================================================================
// Setup Functions
// ============================================================================

/// Tables and enum types live in `interview_schema`; it is added to the search path
/// so enum type names resolve unqualified.
async fn setup_database(config: &Config) -> Result<sqlx::PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET search_path TO public, interview_schema").await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_defaults() {
        let stream = StreamConfig::default();
        assert_eq!(stream.chunk_size, 50);
        assert_eq!(stream.chunk_delay, Duration::from_millis(50));
        assert_eq!(stream.routing_mode, RoutingMode::Llm);
        assert_eq!(stream.limits.min_question, 5);
    }

    #[test]
    fn test_env_or_falls_back_when_unset() {
        let value: u16 = env_or("INTERVIEW_PREP_TEST_UNSET_PORT", 8123).unwrap();
        assert_eq!(value, 8123);
    }
}
