//! The chat completion endpoint.
//!
//! One request carries one user turn. The cycle:
//!
//! 1. Validate `device_id`, `session_id` (store document id), and `message`.
//! 2. If the session still carries the placeholder description, derive a
//!    5-7 word summary of the user message with the lightweight summarizer
//!    and persist it before replying (the widget keys its rename off this
//!    response).
//! 3. Rebuild conversation context from the most recent stored messages.
//! 4. Ask the responder model for a reply.
//! 5. Persist the user turn and the reply as two message documents.
//! 6. Return both stored documents plus the session description.

use axum::extract::{Json, State};
use brain_core::ChatTurn;
use chrono::Utc;
use database::{message, session, Message, NewMessage, Role, PLACEHOLDER_DESCRIPTION};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// How many stored messages are replayed as model context.
const HISTORY_WINDOW: i64 = 30;

/// System instruction for the description summarizer.
const SUMMARY_SYSTEM_PROMPT: &str =
    "You are a summarizer. Create a concise 5-7 word summary for a conversation.";

/// One user turn, addressed to a session by its store document id.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub message: String,
}

/// The completed exchange: the stored user message and model reply, plus the
/// (possibly freshly summarized) session description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session: String,
    pub description: String,
    pub message: Vec<Message>,
}

/// `POST /chat` handler.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    Ok(Json(process_chat(&state, request).await?))
}

/// Run one full completion cycle. Exposed separately from the axum handler
/// so in-process callers (tests, the widget's test transport) can drive it.
pub async fn process_chat(state: &AppState, request: ChatRequest) -> Result<ChatResponse> {
    if request.device_id.trim().is_empty()
        || request.session_id.trim().is_empty()
        || request.message.trim().is_empty()
    {
        return Err(ApiError::MissingParameters);
    }

    let session = session::get_session(&state.pool, &request.session_id).await?;

    // First exchange: derive and persist the session description before
    // replying, since the widget renames off this same response cycle.
    let description = if session.description == PLACEHOLDER_DESCRIPTION {
        let prompt = format!(
            "Generate a short description (5-7 words) summarizing this conversation: \"{}\"",
            request.message
        );
        let summary = state
            .summarizer
            .complete(SUMMARY_SYSTEM_PROMPT, &[], &prompt)
            .await?;
        let summary = summary.trim().to_string();
        session::set_description(&state.pool, &session.id, &summary).await?;
        info!(session = %session.id, "Summarized session description");
        summary
    } else {
        session.description.clone()
    };

    // Reconstruct context: newest-first page, reversed to chronological.
    let mut recent = message::list_recent_messages(
        &state.pool,
        &session.session_id,
        None,
        HISTORY_WINDOW,
    )
    .await?;
    recent.reverse();
    let history: Vec<ChatTurn> = recent.iter().map(to_turn).collect();

    debug!(
        session = %session.id,
        turns = history.len(),
        "Requesting completion"
    );

    let reply = state
        .responder
        .complete(&state.system_prompt, &history, &request.message)
        .await?;

    let now = Utc::now().timestamp_millis();
    let user_message = message::insert_message(
        &state.pool,
        &NewMessage {
            message_id: &Uuid::new_v4().to_string(),
            device_id: &request.device_id,
            session_id: &session.session_id,
            role: Role::User,
            message: &request.message,
            timestamp: now,
        },
    )
    .await?;

    // The reply sorts strictly after the user turn even within one millisecond.
    let ai_message = message::insert_message(
        &state.pool,
        &NewMessage {
            message_id: &Uuid::new_v4().to_string(),
            device_id: &request.device_id,
            session_id: &session.session_id,
            role: Role::Model,
            message: &reply,
            timestamp: user_message.timestamp + 1,
        },
    )
    .await?;

    Ok(ChatResponse {
        session: session.id,
        description,
        message: vec![user_message, ai_message],
    })
}

fn to_turn(message: &Message) -> ChatTurn {
    match message.role {
        Role::User => ChatTurn::user(message.message.clone()),
        Role::Model => ChatTurn::model(message.message.clone()),
    }
}
