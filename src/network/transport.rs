use async_trait::async_trait;
use thiserror::Error;

use crate::common::{ActionStatus, ClientInfo, ConnectForm, RawMessage, Roster};

/// Shown inline when the connect request got no usable answer.
pub const GENERIC_CONNECT_ERROR: &str = "エラーが発生しました。もう一度お試しください。";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("unexpected status: {status} body={body}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("server rejected connection: {0}")]
    Rejected(String),
    /// JSON error body without an `error` message.
    #[error("server refused connection with status {0}")]
    Refused(reqwest::StatusCode),
    /// Failure status with a body that is not JSON (e.g. an HTML error page).
    #[error("server failed with status {0}: {1}")]
    Unreadable(reqwest::StatusCode, String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ConnectError {
    /// Text for the inline error under the connect form, if any.
    pub fn inline_message(&self) -> Option<String> {
        match self {
            ConnectError::Rejected(message) => Some(message.clone()),
            ConnectError::Refused(_) => None,
            ConnectError::Unreadable(..) | ConnectError::Transport(_) => {
                Some(GENERIC_CONNECT_ERROR.to_string())
            }
        }
    }
}

/// Everything the client asks of the chat server.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn connect(&self, form: &ConnectForm) -> Result<(), ConnectError>;

    async fn fetch_client_info(&self) -> Result<ClientInfo, TransportError>;

    async fn fetch_roster(&self) -> Result<Roster, TransportError>;

    /// `limit` asks the server for only the most recent messages.
    async fn fetch_messages(&self, limit: Option<usize>) -> Result<Vec<RawMessage>, TransportError>;

    async fn submit_message(&self, text: &str) -> Result<ActionStatus, TransportError>;

    async fn terminate(&self) -> Result<ActionStatus, TransportError>;
}
