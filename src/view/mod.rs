//! Pure rendering: data plus UI state in, view description out.
//!
//! Nothing here touches the network or egui. The GUI draws these values and
//! headless mode turns them into markup.

pub mod markup;

use chrono::{DateTime, Local};
use tokio::sync::mpsc;

use crate::common::{ChatMessage, PeerStatus, Roster, SessionCommand};
use crate::sync::ExpansionState;

/// Capability handed to each rendered card so it can ask the session to flip
/// its detail panel.
#[derive(Debug, Clone)]
pub struct ToggleHandle {
    nickname: String,
    commands: mpsc::Sender<SessionCommand>,
}

impl ToggleHandle {
    pub fn new(nickname: impl Into<String>, commands: mpsc::Sender<SessionCommand>) -> Self {
        Self {
            nickname: nickname.into(),
            commands,
        }
    }

    pub fn fire(&self) {
        if let Err(err) = self
            .commands
            .try_send(SessionCommand::ToggleCard(self.nickname.clone()))
        {
            log::warn!("Failed to send toggle for {}: {err}", self.nickname);
        }
    }
}

#[derive(Debug, Clone)]
pub struct PeerCard {
    pub nickname: String,
    pub ip: String,
    pub port: String,
    pub status_label: String,
    pub status: PeerStatus,
    pub expanded: bool,
    pub toggle: ToggleHandle,
}

/// Build the peer list for a roster snapshot.
///
/// Only nicknames present in `roster` produce a card; stored expansion flags
/// for absent peers are ignored.
pub fn render_peer_list(
    roster: &Roster,
    expansion: &ExpansionState,
    online_sentinel: &str,
    commands: &mpsc::Sender<SessionCommand>,
) -> Vec<PeerCard> {
    roster
        .iter()
        .map(|(nickname, info)| PeerCard {
            nickname: nickname.clone(),
            ip: info.ip.clone(),
            port: info.port.clone(),
            status_label: info.status.clone(),
            status: PeerStatus::classify(&info.status, online_sentinel),
            expanded: expansion.is_expanded(nickname),
            toggle: ToggleHandle::new(nickname.clone(), commands.clone()),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntry {
    pub username: String,
    pub content: String,
    /// `YYYY-MM-DD HH:MM:SS`, shown on hover.
    pub full_timestamp: String,
    /// `HH:MM`
    pub time_only: String,
}

impl MessageEntry {
    /// Messages carry no reliable time of their own; stamp them with the
    /// moment they were rendered.
    pub fn render(message: &ChatMessage, at: DateTime<Local>) -> Self {
        Self {
            username: message.username.clone(),
            content: message.content.clone(),
            full_timestamp: at.format("%Y-%m-%d %H:%M:%S").to_string(),
            time_only: at.format("%H:%M").to_string(),
        }
    }
}
