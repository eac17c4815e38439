//! Non-interactive subcommands.

use std::error::Error;
use std::sync::Arc;

use tracing::info;

use newsbot_client::NewsService;
use newsbot_core::{Message, Role, LOADING_CONVERSATION_TEXT};
use newsbot_session::{EngineConfig, Intent, SessionOrigin, SessionRuntime, SessionStore};
use newsbot_ui::{format_clock, CONTEXT_MARKER};

/// Submit one message and print the reply.
///
/// Returns `false` when the reply is an inline failure.
pub async fn ask(
    config: &EngineConfig,
    service: Arc<dyn NewsService>,
    store: SessionStore,
    text: &str,
) -> Result<bool, Box<dyn Error>> {
    if text.trim().is_empty() {
        return Err("nothing to ask".into());
    }

    let mut runtime = SessionRuntime::start(config, service, store);
    // Startup hydration must settle before the engine accepts input.
    runtime.settle().await;

    runtime.handle_intent(Intent::Submit(text.to_string()));
    runtime.settle().await;

    let snapshot = runtime.snapshot();
    let last = snapshot
        .messages
        .last()
        .ok_or("conversation is empty")?;
    println!("{}", format_message(last));
    Ok(!last.is_failure())
}

/// Fetch and print the transcript of the current session.
pub async fn history(
    config: &EngineConfig,
    service: Arc<dyn NewsService>,
    store: SessionStore,
) -> Result<(), Box<dyn Error>> {
    let mut runtime = SessionRuntime::open(config, service, store);
    runtime.hydrate_current(LOADING_CONVERSATION_TEXT);
    runtime.settle().await;

    for message in &runtime.snapshot().messages {
        println!("{}", format_message(message));
    }
    Ok(())
}

/// Reset the current conversation, clearing the remote history.
pub async fn reset(
    config: &EngineConfig,
    service: Arc<dyn NewsService>,
    store: SessionStore,
) -> Result<(), Box<dyn Error>> {
    let mut runtime = SessionRuntime::open(config, service, store);
    runtime.handle_intent(Intent::Reset);
    runtime.settle().await;

    println!("Conversation reset (session {})", runtime.snapshot().session_id);
    Ok(())
}

/// Print the current session id and where it lives.
pub fn session(mut store: SessionStore) {
    let id = store.get_or_create_session_id();
    let origin = match store.origin() {
        Some(SessionOrigin::Restored) => "restored",
        Some(SessionOrigin::Created) => "created",
        Some(SessionOrigin::Ephemeral) | None => "ephemeral",
    };
    let durability = if store.is_durable() {
        "durable"
    } else {
        "not persisted"
    };
    println!("{} ({}, {})", id, origin, durability);
}

/// Remove the stored session id and history, starting a fresh session.
pub fn forget(
    config: &EngineConfig,
    service: Arc<dyn NewsService>,
    store: SessionStore,
) -> Result<(), Box<dyn Error>> {
    let mut runtime = SessionRuntime::open(config, service, store);
    let fresh = runtime.forget()?;
    info!(session_id = %fresh, "Local state cleared");
    println!("Forgot all conversations; new session {}", fresh);
    Ok(())
}

/// One transcript line: `[HH:MM] Speaker: text`, plus the context marker.
pub fn format_message(message: &Message) -> String {
    let speaker = match message.role {
        Role::User => "You",
        Role::Assistant => "NewsBot",
    };
    let mut line = format!(
        "[{}] {}: {}",
        format_clock(message.created_at),
        speaker,
        message.content
    );
    if message.has_context == Some(true) {
        line.push_str(&format!("\n        ({})", CONTEXT_MARKER));
    }
    line
}
