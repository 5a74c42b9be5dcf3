//! Runs a chat session without a window. The view is logged and, when a
//! snapshot path is given, rendered to an HTML file after every change.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::common::{ConnectForm, PeerStatus, SessionCommand, SessionEvent};
use crate::network::{ChatTransport, ConnectError};
use crate::sync::{Session, SessionSettings};
use crate::ui::state::AppState;
use crate::view::markup;

const EVENT_BUFFER: usize = 100;

pub async fn run(
    transport: Arc<dyn ChatTransport>,
    settings: SessionSettings,
    form: ConnectForm,
    snapshot: Option<PathBuf>,
) -> Result<(), ConnectError> {
    transport.connect(&form).await?;
    log::info!("Connected as {}", form.nickname);

    let (event_tx, mut event_rx) = mpsc::channel(EVENT_BUFFER);
    let (session, commands) = Session::new(transport, settings, event_tx);
    let task = tokio::spawn(session.run());
    let mut state = AppState::new(form);

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                log_event(&event);
                let leave = state.apply_event(event);
                if let Some(path) = &snapshot {
                    write_snapshot(path, &state).await;
                }
                if leave {
                    break;
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    log::error!("Failed to listen for Ctrl-C: {err}");
                    break;
                }
                log::info!("Ctrl-C received; disconnecting");
                if let Err(err) = commands.send(SessionCommand::Disconnect).await {
                    log::warn!("Failed to send disconnect to session: {err}");
                }
            }
        }
    }

    drop(commands);
    drop(state);
    if let Err(err) = task.await {
        log::error!("Session task failed: {err}");
    }
    Ok(())
}

fn log_event(event: &SessionEvent) {
    match event {
        SessionEvent::ClientInfo(info) => {
            log::info!("Logged in as {}", info.nickname.as_deref().unwrap_or("-"));
        }
        SessionEvent::RosterReplaced(cards) => {
            let online = cards
                .iter()
                .filter(|card| card.status == PeerStatus::Online)
                .count();
            log::info!("Roster: {} peers ({online} online)", cards.len());
        }
        SessionEvent::MessagesAppended(entries) => {
            for entry in entries {
                log::info!("[{}] {}: {}", entry.time_only, entry.username, entry.content);
            }
        }
        SessionEvent::InputCleared => log::debug!("Message accepted"),
        SessionEvent::Disconnected => log::info!("Disconnected"),
    }
}

async fn write_snapshot(path: &Path, state: &AppState) {
    if let Err(err) = crate::storage::ensure_parent_dir(path) {
        log::warn!("Failed to create snapshot directory for {}: {err}", path.display());
        return;
    }
    if let Err(err) = tokio::fs::write(path, markup::render_document(state)).await {
        log::warn!("Failed to write snapshot {}: {err}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::mock::MockTransport;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn writes_escaped_snapshot() {
        let mock = MockTransport::default();
        mock.push_messages(json!([{"username": "<b>eve</b>", "content": "hi & bye"}]));
        let mock = Arc::new(mock);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.html");
        let settings = SessionSettings {
            poll_interval: Duration::from_secs(60),
            message_limit: None,
            online_sentinel: "オンライン".into(),
        };

        let form = ConnectForm {
            nickname: "alice".into(),
            ..ConnectForm::default()
        };
        let task = tokio::spawn(run(mock.clone(), settings, form, Some(path.clone())));

        // Wait for the first snapshot containing the message.
        let mut html = String::new();
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            html = tokio::fs::read_to_string(&path).await.unwrap_or_default();
            if html.contains("message-content") {
                break;
            }
        }
        assert!(html.contains("&lt;b&gt;eve&lt;/b&gt;"));
        assert!(html.contains("hi &amp; bye"));
        assert!(!html.contains("<b>eve"));

        task.abort();
    }
}
