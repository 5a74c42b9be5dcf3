use crate::common::types::ClientInfo;
use crate::view::{MessageEntry, PeerCard};

/// Sự kiện từ session gửi lên UI.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    ClientInfo(ClientInfo),
    /// Complete peer list; replaces whatever was shown before.
    RosterReplaced(Vec<PeerCard>),
    /// Unseen messages in server order, to be appended.
    MessagesAppended(Vec<MessageEntry>),
    /// The server acknowledged the last submission.
    InputCleared,
    /// Termination acknowledged; leave the chat view.
    Disconnected,
}
