use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::common::{ActionStatus, ClientInfo, ConnectForm, RawMessage, Roster};
use crate::common::types::MessagesEnvelope;

use super::transport::{ChatTransport, ConnectError, TransportError};

const CSRF_COOKIE: &str = "csrftoken";
const CSRF_HEADER: &str = "X-CSRFToken";

/// Talks to the chat web server over plain HTTP requests.
///
/// Cookies (session and `csrftoken`) live in a shared jar so every
/// state-mutating request can echo the CSRF token back as a header.
pub struct HttpTransport {
    http: Client,
    jar: Arc<Jar>,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct ConnectRejection {
    #[serde(default)]
    error: Option<String>,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let base_url =
            Url::parse(base_url).map_err(|err| TransportError::InvalidUrl(err.to_string()))?;
        let jar = Arc::new(Jar::default());
        let http = Client::builder().cookie_provider(jar.clone()).build()?;
        Ok(Self {
            http,
            jar,
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|err| TransportError::InvalidUrl(err.to_string()))
    }

    fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        csrf_from_cookie_header(header.to_str().ok()?)
    }

    fn with_csrf(&self, request: RequestBuilder) -> RequestBuilder {
        match self.csrf_token() {
            Some(token) => request.header(CSRF_HEADER, token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, TransportError> {
        let res = self.http.get(url).send().await?;
        decode(res).await
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, TransportError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(TransportError::UnexpectedStatus { status, body });
    }
    let bytes = res.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Picks `csrftoken` out of a `Cookie` header value (`a=1; csrftoken=xyz`).
fn csrf_from_cookie_header(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(CSRF_COOKIE)?.strip_prefix('='))
        .map(str::to_string)
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn connect(&self, form: &ConnectForm) -> Result<(), ConnectError> {
        let url = self.endpoint("/")?;

        // Lấy cookie csrftoken trước khi gửi form
        self.http
            .get(url.clone())
            .send()
            .await
            .map_err(TransportError::from)?;

        let res = self
            .with_csrf(self.http.post(url))
            .form(form)
            .send()
            .await
            .map_err(TransportError::from)?;

        let status = res.status();
        if status.is_success() {
            return Ok(());
        }

        let bytes = res.bytes().await.map_err(TransportError::from)?;
        match serde_json::from_slice::<ConnectRejection>(&bytes) {
            Ok(ConnectRejection {
                error: Some(message),
            }) => Err(ConnectError::Rejected(message)),
            Ok(ConnectRejection { error: None }) => Err(ConnectError::Refused(status)),
            Err(err) => {
                log::warn!("Connect failed with {status} and a non-JSON body: {err}");
                Err(ConnectError::Unreadable(
                    status,
                    String::from_utf8_lossy(&bytes).into_owned(),
                ))
            }
        }
    }

    async fn fetch_client_info(&self) -> Result<ClientInfo, TransportError> {
        self.get_json(self.endpoint("/get_client_info/")?).await
    }

    async fn fetch_roster(&self) -> Result<Roster, TransportError> {
        self.get_json(self.endpoint("/get_peer_info/")?).await
    }

    async fn fetch_messages(&self, limit: Option<usize>) -> Result<Vec<RawMessage>, TransportError> {
        let mut url = self.endpoint("/get_messages/")?;
        if let Some(limit) = limit {
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string());
        }
        let envelope: MessagesEnvelope = self.get_json(url).await?;
        Ok(envelope.messages)
    }

    async fn submit_message(&self, text: &str) -> Result<ActionStatus, TransportError> {
        let url = self.endpoint("/send_message/")?;
        let res = self
            .with_csrf(self.http.post(url))
            .form(&[("message", text)])
            .send()
            .await?;
        decode(res).await
    }

    async fn terminate(&self) -> Result<ActionStatus, TransportError> {
        let url = self.endpoint("/disconnect/")?;
        let res = self.with_csrf(self.http.post(url)).send().await?;
        decode(res).await
    }
}
