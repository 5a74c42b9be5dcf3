//! Scripted in-memory transport for session tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::common::{ActionStatus, ClientInfo, ConnectForm, RawMessage, Roster};

use super::transport::{ChatTransport, ConnectError, TransportError};

#[derive(Default)]
pub struct CallCounts {
    pub client_info: AtomicUsize,
    pub roster: AtomicUsize,
    pub messages: AtomicUsize,
    pub submit: AtomicUsize,
    pub terminate: AtomicUsize,
}

/// Each endpoint pops the next scripted response. An exhausted roster or
/// message script answers 503; an exhausted submit/terminate script answers
/// `{status: "error"}`.
#[derive(Default)]
pub struct MockTransport {
    rosters: Mutex<VecDeque<Result<Roster, TransportError>>>,
    batches: Mutex<VecDeque<Result<Vec<RawMessage>, TransportError>>>,
    submits: Mutex<VecDeque<&'static str>>,
    terminations: Mutex<VecDeque<&'static str>>,
    submitted: Mutex<Vec<String>>,
    pub calls: CallCounts,
}

pub fn unavailable() -> TransportError {
    TransportError::UnexpectedStatus {
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: String::new(),
    }
}

impl MockTransport {
    pub fn push_roster(&self, roster: Result<Roster, TransportError>) {
        self.rosters.lock().unwrap().push_back(roster);
    }

    pub fn push_messages(&self, batch: serde_json::Value) {
        let batch = serde_json::from_value(batch).expect("scripted batch");
        self.batches.lock().unwrap().push_back(Ok(batch));
    }

    pub fn push_submit(&self, status: &'static str) {
        self.submits.lock().unwrap().push_back(status);
    }

    pub fn push_terminate(&self, status: &'static str) {
        self.terminations.lock().unwrap().push_back(status);
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn ack(status: &str) -> ActionStatus {
    ActionStatus {
        status: status.to_string(),
        message: None,
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn connect(&self, _form: &ConnectForm) -> Result<(), ConnectError> {
        Ok(())
    }

    async fn fetch_client_info(&self) -> Result<ClientInfo, TransportError> {
        self.calls.client_info.fetch_add(1, Ordering::SeqCst);
        Ok(ClientInfo {
            nickname: Some("alice".into()),
            ..ClientInfo::default()
        })
    }

    async fn fetch_roster(&self) -> Result<Roster, TransportError> {
        self.calls.roster.fetch_add(1, Ordering::SeqCst);
        self.rosters
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unavailable()))
    }

    async fn fetch_messages(&self, _limit: Option<usize>) -> Result<Vec<RawMessage>, TransportError> {
        self.calls.messages.fetch_add(1, Ordering::SeqCst);
        self.batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unavailable()))
    }

    async fn submit_message(&self, text: &str) -> Result<ActionStatus, TransportError> {
        self.calls.submit.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(text.to_string());
        let status = self.submits.lock().unwrap().pop_front().unwrap_or("error");
        Ok(ack(status))
    }

    async fn terminate(&self) -> Result<ActionStatus, TransportError> {
        self.calls.terminate.fetch_add(1, Ordering::SeqCst);
        let status = self.terminations.lock().unwrap().pop_front().unwrap_or("error");
        Ok(ack(status))
    }
}
