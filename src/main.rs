use interview_prep_agent::handlers::create_app_router;
use interview_prep_agent::init::app_init;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("🚀 Starting Interview Prep Agent Server...");
    dotenv::dotenv().ok();
    let (config, state) = app_init().await?;
    log::info!("✅ Application state initialized");
    let app = create_app_router(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("");
    log::info!("🎉 Server started!");
    log::info!("📍 http://{}", addr);
    log::info!("📡 Stream: http://{}/api/agents/answer-stream", addr);
    log::info!("💬 Answer: http://{}/api/agents/answer", addr);
    log::info!("🧭 Agents: http://{}/api/agents/available", addr);
    log::info!("📋 Tracking: http://{}/api/interviews", addr);
    log::info!("🧩 Skills: http://{}/api/skills", addr);
    log::info!("❤️  Health: http://{}/api/health", addr);
    log::info!("");
    log::info!("🤖 Model: {} @ {}", config.ai.chat_model, config.ai.url);
    log::info!("🔀 Routing: {}", config.stream.routing_mode);
    log::info!(
        "✂️  Chunks: {} chars every {:?}",
        config.stream.chunk_size,
        config.stream.chunk_delay
    );
    log::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
