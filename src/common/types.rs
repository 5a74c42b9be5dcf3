use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Domain model đại diện một tin nhắn chat.
///
/// Any field the server sends besides `username` and `content` is kept in
/// `extra`, so two messages only compare equal when every field matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub username: String,
    pub content: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ChatMessage {
    #[cfg(test)]
    pub fn new(username: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            content: content.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Exact-match string form used as the dedup identity.
    ///
    /// `extra` is a `BTreeMap`, so the field order is stable no matter how the
    /// server ordered the keys.
    pub fn canonical_key(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// One entry of the `messages` array. The server sometimes double-encodes
/// messages as JSON strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawMessage {
    Encoded(String),
    Object(serde_json::Map<String, Value>),
    Unsupported(Value),
}

/// Body of `GET /get_messages/`.
#[derive(Debug, Deserialize)]
pub struct MessagesEnvelope {
    pub messages: Vec<RawMessage>,
}

/// Entry of the roster map returned by `GET /get_peer_info/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    #[serde(deserialize_with = "deserialize_text")]
    pub ip: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub port: String,
    pub status: String,
}

/// Full-replace roster snapshot keyed by nickname, in the order the server
/// listed the peers.
pub type Roster = IndexMap<String, PeerInfo>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerStatus {
    Online,
    Offline,
}

impl PeerStatus {
    /// Online only on an exact match against the sentinel.
    pub fn classify(status: &str, online_sentinel: &str) -> Self {
        if status == online_sentinel {
            PeerStatus::Online
        } else {
            PeerStatus::Offline
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            PeerStatus::Online => "online",
            PeerStatus::Offline => "offline",
        }
    }
}

/// `{ status: "success" }` style acknowledgement for state-mutating calls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActionStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl ActionStatus {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Address {
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub ip: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub port: Option<String>,
}

/// Body of `GET /get_client_info/`. The server answers `{}` when no
/// connection exists, so every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ClientInfo {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub client_address: Option<Address>,
    #[serde(default)]
    pub server_connection: Option<Address>,
}

/// Values posted to the connect endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectForm {
    pub nickname: String,
    pub secret_key: String,
    pub ip_address: String,
    pub port: String,
}

/// Ports and addresses arrive as strings or numbers depending on the peer.
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let val: Value = Value::deserialize(deserializer)?;
    match val {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom("expected string or number")),
    }
}

fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let val: Value = Value::deserialize(deserializer)?;
    match val {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(serde::de::Error::custom("expected string, number or null")),
    }
}
