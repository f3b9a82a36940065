//! End-to-end widget tests: the controller drives the real completion
//! service in process, against a shared in-memory database, with scripted
//! brains standing in for the models.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use api::routes::chat::{process_chat, ChatRequest};
use api::{ApiError, AppState};
use async_trait::async_trait;
use chat_widget::{
    ChatController, CompletionRequest, CompletionResponse, CompletionTransport, Delivery,
    DeviceIdentity, ScrollEffect, SendOutcome, TransportError, WidgetError,
};
use database::{message, session, Database, NewMessage, Role, PLACEHOLDER_DESCRIPTION};
use mock_brain::ScriptedBrain;

const DEVICE: &str = "dev-1";

/// Transport that drives the service handler directly, no HTTP.
struct InProcessTransport {
    state: AppState,
}

#[async_trait]
impl CompletionTransport for InProcessTransport {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, TransportError> {
        let result = process_chat(
            &self.state,
            ChatRequest {
                device_id: request.device_id,
                session_id: request.session_id,
                message: request.message,
            },
        )
        .await;

        match result {
            Ok(response) => Ok(CompletionResponse {
                session: response.session,
                description: response.description,
                message: response.message,
            }),
            Err(ApiError::MissingParameters) => Err(TransportError::Api {
                status: 400,
                message: "Missing parameters".to_string(),
            }),
            Err(_) => Err(TransportError::Api {
                status: 500,
                message: "Internal Server Error".to_string(),
            }),
        }
    }
}

/// Transport that fails the first `failures` calls, then delegates.
struct FlakyTransport {
    inner: InProcessTransport,
    failures: AtomicU32,
}

#[async_trait]
impl CompletionTransport for FlakyTransport {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, TransportError> {
        let should_fail = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(TransportError::Network("connection reset".to_string()));
        }
        self.inner.complete(request).await
    }
}

impl FlakyTransport {
    fn failing_once(state: AppState) -> Self {
        Self {
            inner: InProcessTransport { state },
            failures: AtomicU32::new(1),
        }
    }
}

async fn test_db() -> Database {
    let db = Database::connect_with_pool_size("sqlite::memory:", 1)
        .await
        .unwrap();
    db.migrate().await.unwrap();
    db
}

fn app_state(db: &Database, responder: ScriptedBrain, summarizer: ScriptedBrain) -> AppState {
    AppState::new(
        db.pool().clone(),
        Arc::new(responder),
        Arc::new(summarizer),
        "You are a portfolio assistant.",
    )
}

async fn controller(
    db: &Database,
    responder: ScriptedBrain,
    summarizer: ScriptedBrain,
) -> ChatController<InProcessTransport> {
    let transport = InProcessTransport {
        state: app_state(db, responder, summarizer),
    };
    let mut controller = ChatController::new(
        db.pool().clone(),
        DeviceIdentity::from_id(DEVICE),
        transport,
    );
    controller.initialize("test-agent").await.unwrap();
    controller
}

#[tokio::test]
async fn test_bootstrap_creates_session_and_greets() {
    let db = test_db().await;
    let controller = controller(&db, ScriptedBrain::default(), ScriptedBrain::default()).await;

    let sessions = controller.sessions().sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].description, PLACEHOLDER_DESCRIPTION);
    assert_eq!(controller.active_session_id(), Some(sessions[0].id.as_str()));

    // The greeting is local: visible in the log, absent from the store.
    let entries = controller.messages().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message.role, Role::Model);
    assert_eq!(entries[0].delivery, Delivery::Confirmed);
    let stored = message::list_recent_messages(db.pool(), &sessions[0].session_id, None, 10)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_send_round_trip() {
    let db = test_db().await;
    let responder = ScriptedBrain::new(["I mostly work with Rust and TypeScript."]);
    let summarizer = ScriptedBrain::new(["Programming languages discussion"]);
    let mut controller = controller(&db, responder, summarizer).await;

    let outcome = controller
        .send_message("What languages do you use?")
        .await
        .unwrap();
    assert_eq!(outcome, SendOutcome::Sent);
    assert!(!controller.is_typing());

    // Greeting, then the confirmed user turn and the reply.
    let entries = controller.messages().entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1].message.message, "What languages do you use?");
    assert_eq!(entries[1].message.role, Role::User);
    assert_eq!(entries[1].delivery, Delivery::Confirmed);
    assert!(!entries[1].message.message_id.starts_with("msg_"));
    assert_eq!(
        entries[2].message.message,
        "I mostly work with Rust and TypeScript."
    );
    assert_eq!(entries[2].message.role, Role::Model);

    // The session picked up the summarized description.
    assert_eq!(
        controller.sessions().sessions()[0].description,
        "Programming languages discussion"
    );
}

#[tokio::test]
async fn test_description_rename_happens_once() {
    let db = test_db().await;
    let summarizer = ScriptedBrain::new(["First summary", "Second summary"]);
    let mut controller = controller(
        &db,
        ScriptedBrain::new(["a", "b"]),
        summarizer.clone(),
    )
    .await;

    controller.send_message("first turn").await.unwrap();
    controller.send_message("second turn").await.unwrap();

    assert_eq!(summarizer.call_count().await, 1);
    assert_eq!(
        controller.sessions().sessions()[0].description,
        "First summary"
    );
}

#[tokio::test]
async fn test_blank_input_ignored() {
    let db = test_db().await;
    let mut controller =
        controller(&db, ScriptedBrain::default(), ScriptedBrain::default()).await;
    let entries_before = controller.messages().entries().len();

    let outcome = controller.send_message("   ").await.unwrap();

    assert_eq!(outcome, SendOutcome::Ignored);
    assert_eq!(controller.messages().entries().len(), entries_before);
}

#[tokio::test]
async fn test_send_bumps_session_to_top() {
    let db = test_db().await;
    let mut controller = controller(
        &db,
        ScriptedBrain::new(["reply"]),
        ScriptedBrain::new(["Summary"]),
    )
    .await;

    let first = controller.sessions().sessions()[0].id.clone();
    controller.new_session().await.unwrap();
    controller.select_session(&first).await.unwrap();
    assert_ne!(controller.sessions().sessions()[0].id, first);

    controller.send_message("hello again").await.unwrap();
    assert_eq!(controller.sessions().sessions()[0].id, first);
}

#[tokio::test]
async fn test_delete_active_falls_back_then_recreates() {
    let db = test_db().await;
    let mut controller =
        controller(&db, ScriptedBrain::default(), ScriptedBrain::default()).await;

    let original = controller.sessions().sessions()[0].id.clone();
    let second = controller.new_session().await.unwrap();
    assert_eq!(controller.active_session_id(), Some(second.as_str()));

    // Deleting the active session falls back to the remaining one.
    controller.delete_session(&second).await.unwrap();
    assert_eq!(controller.active_session_id(), Some(original.as_str()));
    assert_eq!(controller.sessions().sessions().len(), 1);

    // Deleting the last session creates and selects a fresh one.
    controller.delete_session(&original).await.unwrap();
    assert_eq!(controller.sessions().sessions().len(), 1);
    let replacement = controller.sessions().sessions()[0].clone();
    assert_ne!(replacement.id, original);
    assert_eq!(controller.active_session_id(), Some(replacement.id.as_str()));

    // Neither deleted session resurfaces on a reload.
    let listed = session::list_active_sessions(db.pool(), DEVICE, None, 50)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, replacement.id);
}

#[tokio::test]
async fn test_history_backfill_is_chronological_and_complete() {
    let db = test_db().await;
    let seeded = session::create_session(db.pool(), DEVICE, "sess-old", PLACEHOLDER_DESCRIPTION)
        .await
        .unwrap();
    for i in 0..25 {
        let role = if i % 2 == 0 { Role::User } else { Role::Model };
        message::insert_message(
            db.pool(),
            &NewMessage {
                message_id: &format!("m-{i}"),
                device_id: DEVICE,
                session_id: "sess-old",
                role,
                message: &format!("turn {i}"),
                timestamp: i,
            },
        )
        .await
        .unwrap();
    }

    let mut controller =
        controller(&db, ScriptedBrain::default(), ScriptedBrain::default()).await;
    assert_eq!(controller.active_session_id(), Some(seeded.id.as_str()));

    // Bootstrap loaded the newest page only, no greeting.
    assert_eq!(controller.messages().entries().len(), 10);
    assert_eq!(
        controller.messages().entries()[0].message.message_id,
        "m-15"
    );

    assert_eq!(
        controller.load_older_messages().await.unwrap(),
        ScrollEffect::PreserveAnchor
    );
    assert_eq!(controller.messages().entries().len(), 20);
    assert_eq!(
        controller.load_older_messages().await.unwrap(),
        ScrollEffect::PreserveAnchor
    );

    // Exhaustion is sticky.
    assert!(controller.messages().fetch_state().is_exhausted());
    assert_eq!(
        controller.load_older_messages().await.unwrap(),
        ScrollEffect::None
    );

    // Full log, oldest first, no duplicates.
    let entries = controller.messages().entries();
    assert_eq!(entries.len(), 25);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.message.message_id, format!("m-{i}"));
    }
}

#[tokio::test]
async fn test_failed_send_marks_entry_and_retry_recovers() {
    let db = test_db().await;
    let state = app_state(
        &db,
        ScriptedBrain::new(["recovered reply"]),
        ScriptedBrain::new(["Summary"]),
    );
    let mut controller = ChatController::new(
        db.pool().clone(),
        DeviceIdentity::from_id(DEVICE),
        FlakyTransport::failing_once(state),
    );
    controller.initialize("test-agent").await.unwrap();

    let result = controller.send_message("are you there?").await;
    assert!(matches!(result, Err(WidgetError::Transport(_))));
    assert!(!controller.is_typing());

    // The optimistic entry survives, marked failed.
    let entries = controller.messages().entries();
    let failed = entries.last().unwrap();
    assert_eq!(failed.delivery, Delivery::Failed);
    assert_eq!(failed.message.message, "are you there?");
    let failed_id = failed.message.message_id.clone();

    // Retrying an entry that is not failed is rejected.
    let greeting_id = entries[0].message.message_id.clone();
    assert!(matches!(
        controller.retry_message(&greeting_id).await,
        Err(WidgetError::NotRetryable(_))
    ));

    // Retry of the failed entry completes the exchange in place.
    let outcome = controller.retry_message(&failed_id).await.unwrap();
    assert_eq!(outcome, SendOutcome::Sent);
    assert!(!controller.is_typing());

    let entries = controller.messages().entries();
    assert_eq!(entries.last().unwrap().message.message, "recovered reply");
    let user_entry = &entries[entries.len() - 2];
    assert_eq!(user_entry.message.message, "are you there?");
    assert_eq!(user_entry.delivery, Delivery::Confirmed);
    assert!(entries.iter().all(|e| e.delivery == Delivery::Confirmed));
}
