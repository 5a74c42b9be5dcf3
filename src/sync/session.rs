use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};

use crate::common::{ActionStatus, ClientInfo, RawMessage, Roster, SessionCommand, SessionEvent};
use crate::network::{ChatTransport, TransportError};
use crate::view::MessageEntry;

use super::messages::MessageSynchronizer;
use super::presence::PresenceReconciler;

const COMMAND_BUFFER: usize = 32;
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub poll_interval: Duration,
    pub message_limit: Option<usize>,
    pub online_sentinel: String,
}

/// Result of one request, handed back to the session loop.
enum Completion {
    ClientInfo(Result<ClientInfo, TransportError>),
    Roster {
        seq: u64,
        result: Result<Roster, TransportError>,
    },
    Messages(Result<Vec<RawMessage>, TransportError>),
    Submitted(Result<ActionStatus, TransportError>),
    Terminated(Result<ActionStatus, TransportError>),
}

/// One connected chat session.
///
/// All sync state (seen index, roster, expansion flags, timer) is owned here
/// and only touched from [`run`](Self::run). Requests run concurrently inside
/// `in_flight`; their results are applied one at a time by the loop, so
/// overlapping poll cycles never race on the state.
pub struct Session {
    transport: Arc<dyn ChatTransport>,
    settings: SessionSettings,
    presence: PresenceReconciler,
    messages: MessageSynchronizer,
    ticker: Option<Interval>,
    in_flight: FuturesUnordered<BoxFuture<'static, Completion>>,
    events: mpsc::Sender<SessionEvent>,
    commands: mpsc::Receiver<SessionCommand>,
    /// Handed to rendered cards as their toggle capability. Weak so the
    /// command channel still closes once the UI drops its sender.
    toggles: mpsc::WeakSender<SessionCommand>,
    torn_down: bool,
}

impl Session {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        settings: SessionSettings,
        events: mpsc::Sender<SessionEvent>,
    ) -> (Self, mpsc::Sender<SessionCommand>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let presence = PresenceReconciler::new(settings.online_sentinel.clone());
        let session = Self {
            transport,
            settings,
            presence,
            messages: MessageSynchronizer::default(),
            ticker: None,
            in_flight: FuturesUnordered::new(),
            events,
            commands: command_rx,
            toggles: command_tx.downgrade(),
            torn_down: false,
        };
        (session, command_tx)
    }

    pub async fn run(mut self) {
        self.start();

        loop {
            tokio::select! {
                _ = next_tick(&mut self.ticker) => self.on_tick(),
                Some(done) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    self.apply(done).await;
                }
                command = self.commands.recv(), if !self.torn_down => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        log::info!("UI closed; tearing down session");
                        self.tear_down();
                    }
                },
            }

            if self.torn_down && self.in_flight.is_empty() {
                break;
            }
        }

        log::info!("Session finished");
    }

    fn start(&mut self) {
        let period = self.settings.poll_interval.max(MIN_POLL_INTERVAL);
        // The first tick completes immediately, so the initial fetch needs no
        // special case.
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(ticker);

        let transport = Arc::clone(&self.transport);
        self.in_flight.push(
            async move { Completion::ClientInfo(transport.fetch_client_info().await) }.boxed(),
        );
        log::info!("Session started, polling every {period:?}");
    }

    fn on_tick(&mut self) {
        self.request_messages();
        self.request_roster();
    }

    fn request_messages(&mut self) {
        let transport = Arc::clone(&self.transport);
        let limit = self.settings.message_limit;
        self.in_flight.push(
            async move { Completion::Messages(transport.fetch_messages(limit).await) }.boxed(),
        );
    }

    fn request_roster(&mut self) {
        let transport = Arc::clone(&self.transport);
        let seq = self.presence.begin_cycle();
        self.in_flight.push(
            async move {
                Completion::Roster {
                    seq,
                    result: transport.fetch_roster().await,
                }
            }
            .boxed(),
        );
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::SendMessage(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return;
                }
                let transport = Arc::clone(&self.transport);
                self.in_flight.push(
                    async move { Completion::Submitted(transport.submit_message(&text).await) }
                        .boxed(),
                );
            }
            SessionCommand::ToggleCard(nickname) => {
                let expanded = self.presence.toggle(&nickname);
                log::debug!("Peer card {nickname} expanded={expanded}");
                self.publish_roster().await;
            }
            SessionCommand::Disconnect => {
                let transport = Arc::clone(&self.transport);
                self.in_flight.push(
                    async move { Completion::Terminated(transport.terminate().await) }.boxed(),
                );
            }
        }
    }

    async fn apply(&mut self, done: Completion) {
        if self.torn_down {
            log::debug!("Ignoring response that landed after teardown");
            return;
        }

        match done {
            Completion::ClientInfo(Ok(info)) => {
                if let Some(server) = &info.server_connection {
                    log::info!(
                        "Server connection: {}:{}",
                        server.ip.as_deref().unwrap_or("-"),
                        server.port.as_deref().unwrap_or("-")
                    );
                }
                self.emit(SessionEvent::ClientInfo(info)).await;
            }
            Completion::ClientInfo(Err(err)) => log::warn!("No client info: {err}"),
            Completion::Roster {
                seq,
                result: Ok(roster),
            } => {
                if self.presence.apply(seq, roster) {
                    self.publish_roster().await;
                }
            }
            Completion::Roster { result: Err(err), .. } => {
                log::warn!("Failed to update peer info: {err}");
            }
            Completion::Messages(Ok(batch)) => {
                let fresh = self.messages.ingest(batch);
                if !fresh.is_empty() {
                    log::debug!("Rendering {} new messages", fresh.len());
                    let now = Local::now();
                    let entries = fresh
                        .iter()
                        .map(|message| MessageEntry::render(message, now))
                        .collect();
                    self.emit(SessionEvent::MessagesAppended(entries)).await;
                }
            }
            Completion::Messages(Err(err)) => log::warn!("Failed to fetch messages: {err}"),
            Completion::Submitted(Ok(ack)) if ack.is_success() => {
                self.emit(SessionEvent::InputCleared).await;
                // Không chờ tick kế tiếp, để người gửi thấy tin nhắn ngay
                self.request_messages();
            }
            Completion::Submitted(Ok(ack)) => log::warn!(
                "Server rejected message: {} {}",
                ack.status,
                ack.message.unwrap_or_default()
            ),
            Completion::Submitted(Err(err)) => log::warn!("Failed to send message: {err}"),
            Completion::Terminated(Ok(ack)) if ack.is_success() => {
                self.tear_down();
                self.emit(SessionEvent::Disconnected).await;
            }
            Completion::Terminated(Ok(ack)) => {
                log::warn!("Server rejected disconnect: {}", ack.status);
            }
            Completion::Terminated(Err(err)) => log::warn!("Failed to disconnect: {err}"),
        }
    }

    async fn publish_roster(&mut self) {
        let Some(commands) = self.toggles.upgrade() else {
            log::debug!("No UI attached; skipping roster render");
            return;
        };
        if let Some(cards) = self.presence.render(&commands) {
            self.emit(SessionEvent::RosterReplaced(cards)).await;
        }
    }

    async fn emit(&mut self, event: SessionEvent) {
        if let Err(err) = self.events.send(event).await {
            log::debug!("UI no longer listening: {err}");
        }
    }

    /// Cancels the poll timer. Safe to call more than once.
    fn tear_down(&mut self) {
        if self.ticker.take().is_some() {
            log::info!("Polling timer stopped");
        }
        self.torn_down = true;
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
