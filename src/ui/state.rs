use crate::common::{ClientInfo, ConnectForm, SessionEvent};
use crate::view::{MessageEntry, PeerCard};

/// Trạng thái cục bộ của UI.
pub struct AppState {
    pub form: ConnectForm,
    pub connect_pending: bool,
    /// Inline, localized error under the connect form.
    pub connect_error: Option<String>,
    pub client_info: ClientInfo,
    pub peer_cards: Vec<PeerCard>,
    pub messages: Vec<MessageEntry>,
    pub input_text: String,
    /// Set when new messages arrive; the chat area scrolls to the newest one.
    pub scroll_to_bottom: bool,
}

impl AppState {
    pub fn new(form: ConnectForm) -> Self {
        Self {
            form,
            connect_pending: false,
            connect_error: None,
            client_info: ClientInfo::default(),
            peer_cards: Vec::new(),
            messages: Vec::new(),
            input_text: String::new(),
            scroll_to_bottom: false,
        }
    }

    /// Returns `true` when the session has ended and the chat view should be
    /// left.
    pub fn apply_event(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::ClientInfo(info) => self.client_info = info,
            SessionEvent::RosterReplaced(cards) => self.peer_cards = cards,
            SessionEvent::MessagesAppended(mut entries) => {
                self.messages.append(&mut entries);
                self.scroll_to_bottom = true;
            }
            SessionEvent::InputCleared => self.input_text.clear(),
            SessionEvent::Disconnected => return true,
        }
        false
    }

    /// Drop everything belonging to the finished session; the form stays.
    pub fn reset_session(&mut self) {
        self.client_info = ClientInfo::default();
        self.peer_cards.clear();
        self.messages.clear();
        self.input_text.clear();
        self.scroll_to_bottom = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(content: &str) -> MessageEntry {
        MessageEntry {
            username: "a".into(),
            content: content.into(),
            full_timestamp: "2024-05-01 09:07:03".into(),
            time_only: "09:07".into(),
        }
    }

    #[test]
    fn appends_messages_in_order_and_requests_scroll() {
        let mut state = AppState::new(ConnectForm::default());
        state.apply_event(SessionEvent::MessagesAppended(vec![entry("1"), entry("2")]));
        state.apply_event(SessionEvent::MessagesAppended(vec![entry("3")]));

        let contents: Vec<_> = state.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["1", "2", "3"]);
        assert!(state.scroll_to_bottom);
    }

    #[test]
    fn input_is_cleared_only_on_acknowledgement() {
        let mut state = AppState::new(ConnectForm::default());
        state.input_text = "hello".into();
        state.apply_event(SessionEvent::MessagesAppended(vec![entry("x")]));
        assert_eq!(state.input_text, "hello");
        state.apply_event(SessionEvent::InputCleared);
        assert!(state.input_text.is_empty());
    }

    #[test]
    fn disconnect_leaves_view_and_reset_keeps_form() {
        let form = ConnectForm {
            nickname: "alice".into(),
            ..ConnectForm::default()
        };
        let mut state = AppState::new(form.clone());
        state.apply_event(SessionEvent::MessagesAppended(vec![entry("x")]));

        assert!(state.apply_event(SessionEvent::Disconnected));
        state.reset_session();
        assert!(state.messages.is_empty());
        assert_eq!(state.form, form);
    }
}
