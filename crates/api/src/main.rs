//! Chat completion server for the Kiki portfolio chat widget.
//!
//! Binds the `/chat` endpoint over SQLite persistence and two Gemini-backed
//! brains: the responder and a cheaper description summarizer.

use std::sync::Arc;

use database::Database;
use gemini_brain::{GeminiBrain, GeminiConfig};
use tracing::info;

use api::config::Config;
use api::routes;
use api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting chat completion server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Responder and summarizer share credentials; the summarizer runs a
    // cheaper model since it only ever produces a short session description.
    let responder_config = GeminiConfig::from_env()?;
    let summarizer_config = responder_config.clone().with_model(&config.summary_model);

    let responder = GeminiBrain::new(responder_config)?;
    let summarizer = GeminiBrain::new(summarizer_config)?;
    info!(
        responder = responder.model(),
        summarizer = summarizer.model(),
        "Brains configured"
    );

    // Build application state
    let state = AppState::new(
        db.pool().clone(),
        Arc::new(responder),
        Arc::new(summarizer),
        config.system_prompt,
    );

    // Build router
    let app = routes::router().with_state(state);

    // Start server
    info!(addr = %config.addr, "Chat completion server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
