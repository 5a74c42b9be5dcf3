//! HTML markup for the rendered view. Every piece of server-supplied text goes
//! through [`escape_html`] before it is placed in markup.

use std::fmt::Write;

use super::{MessageEntry, PeerCard};
use crate::ui::state::AppState;

pub fn escape_html(unsafe_text: &str) -> String {
    let mut escaped = String::with_capacity(unsafe_text.len());
    for ch in unsafe_text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn expanded_class(expanded: bool) -> &'static str {
    if expanded { " expanded" } else { "" }
}

impl PeerCard {
    pub fn to_markup(&self) -> String {
        let nickname = escape_html(&self.nickname);
        let status = self.status.css_class();
        let expanded = expanded_class(self.expanded);
        format!(
            r#"<div class="peer-card {status}" id="peer-{nickname}">
  <button class="peer-card-header" data-toggle="{nickname}">
    <span class="peer-nickname">{nickname}</span>
    <span class="chevron{expanded}"></span>
  </button>
  <div class="peer-card-content{expanded}" id="content-{nickname}">
    <p class="peer-info-item">IP: {ip}</p>
    <p class="peer-info-item">Port: {port}</p>
    <p class="peer-info-item"><span class="status-badge {status}">{label}</span></p>
  </div>
</div>"#,
            ip = escape_html(&self.ip),
            port = escape_html(&self.port),
            label = escape_html(&self.status_label),
        )
    }
}

impl MessageEntry {
    pub fn to_markup(&self) -> String {
        let timestamp = escape_html(&self.full_timestamp);
        format!(
            r#"<div class="message">
  <div class="message-header">
    <strong>{username}</strong>
    <time datetime="{timestamp}" title="{timestamp}">{time}</time>
  </div>
  <div class="message-content">{content}</div>
</div>"#,
            username = escape_html(&self.username),
            time = escape_html(&self.time_only),
            content = escape_html(&self.content),
        )
    }
}

/// Whole chat view as a standalone HTML document.
pub fn render_document(state: &AppState) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"ja\">\n<head><meta charset=\"utf-8\"><title>Chat</title></head>\n<body>\n",
    );

    let nickname = state
        .client_info
        .nickname
        .as_deref()
        .map(escape_html)
        .unwrap_or_default();
    let _ = writeln!(html, "<header id=\"user-nickname\">{nickname}</header>");

    html.push_str("<aside id=\"peer-info\">\n");
    for card in &state.peer_cards {
        html.push_str(&card.to_markup());
        html.push('\n');
    }
    html.push_str("</aside>\n<main id=\"chat-messages\">\n");
    for entry in &state.messages {
        html.push_str(&entry.to_markup());
        html.push('\n');
    }
    html.push_str("</main>\n</body>\n</html>\n");
    html
}
