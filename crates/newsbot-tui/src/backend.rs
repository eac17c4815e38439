//! Background task driving the conversation.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use newsbot_client::NewsService;
use newsbot_session::{EngineConfig, Intent, SessionRuntime, SessionStore};

use crate::event::{BackendCommand, UiEvent};

/// Run the backend loop.
///
/// This function runs in a separate thread with its own tokio runtime. It owns
/// the [`SessionRuntime`], applies commands from the UI and request
/// completions as they arrive, and sends a fresh snapshot after each one.
pub async fn run_backend(
    config: EngineConfig,
    service: Arc<dyn NewsService>,
    store: SessionStore,
    ui_tx: mpsc::Sender<UiEvent>,
    mut cmd_rx: mpsc::Receiver<BackendCommand>,
) {
    info!(base_url = %config.base_url, "Starting conversation backend");

    let mut runtime = SessionRuntime::start(&config, service, store);
    let _ = ui_tx.send(UiEvent::Snapshot(runtime.snapshot())).await;

    loop {
        tokio::select! {
            // Finished requests
            Some(completion) = runtime.next_completion() => {
                runtime.handle_completion(completion);
            }

            // Commands from UI thread
            cmd = cmd_rx.recv() => {
                let intent = match cmd {
                    Some(BackendCommand::Submit(text)) => Intent::Submit(text),
                    Some(BackendCommand::Reset) => Intent::Reset,
                    Some(BackendCommand::SelectHistory(id)) => Intent::SelectHistory(id),
                    Some(BackendCommand::Quit) | None => {
                        info!("Received quit command, shutting down backend");
                        break;
                    }
                };
                debug!(intent = ?intent, "Applying intent");
                runtime.handle_intent(intent);
            }
        }

        if ui_tx
            .send(UiEvent::Snapshot(runtime.snapshot()))
            .await
            .is_err()
        {
            break;
        }
    }

    info!("Backend shutdown complete");
}
