use std::sync::Arc;

use eframe::egui;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use crate::common::{ConnectForm, SessionCommand, SessionEvent};
use crate::network::{ChatTransport, ConnectError};
use crate::storage::FormCache;
use crate::sync::{Session, SessionSettings};

use super::components::{chat_area, connect_form, input_bar, peer_list, user_panel};
use super::state::AppState;

const EVENT_BUFFER: usize = 100;

/// Channels to the running session; present while the chat view is shown.
struct ActiveSession {
    commands: mpsc::Sender<SessionCommand>,
    events: mpsc::Receiver<SessionEvent>,
}

pub struct ChatApp {
    state: AppState,
    runtime: Handle,
    transport: Arc<dyn ChatTransport>,
    settings: SessionSettings,
    form_cache: Option<FormCache>,
    pending_connect: Option<oneshot::Receiver<Result<(), ConnectError>>>,
    session: Option<ActiveSession>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        runtime: Handle,
        transport: Arc<dyn ChatTransport>,
        settings: SessionSettings,
        form_cache: Option<FormCache>,
    ) -> Self {
        let form = form_cache
            .as_ref()
            .map(FormCache::restore_form)
            .unwrap_or_default();

        Self {
            state: AppState::new(form),
            runtime,
            transport,
            settings,
            form_cache,
            pending_connect: None,
            session: None,
        }
    }

    fn begin_connect(&mut self, form: ConnectForm) {
        if let Some(cache) = &self.form_cache {
            cache.save_form(&form);
        }
        self.state.connect_pending = true;
        self.state.connect_error = None;

        let (tx, rx) = oneshot::channel();
        let transport = Arc::clone(&self.transport);
        self.runtime.spawn(async move {
            let _ = tx.send(transport.connect(&form).await);
        });
        self.pending_connect = Some(rx);
    }

    fn poll_connect(&mut self) {
        let Some(rx) = self.pending_connect.as_mut() else {
            return;
        };
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::error::TryRecvError::Empty) => return,
            Err(oneshot::error::TryRecvError::Closed) => {
                log::warn!("Connect task ended without a result");
                self.pending_connect = None;
                self.state.connect_pending = false;
                return;
            }
        };

        self.pending_connect = None;
        self.state.connect_pending = false;
        match outcome {
            Ok(()) => self.start_session(),
            Err(err) => {
                log::warn!("Connect failed: {err}");
                self.state.connect_error = err.inline_message();
            }
        }
    }

    fn start_session(&mut self) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (session, commands) =
            Session::new(Arc::clone(&self.transport), self.settings.clone(), event_tx);
        self.runtime.spawn(session.run());
        self.session = Some(ActiveSession {
            commands,
            events: event_rx,
        });
        log::info!("Chat session started");
    }

    fn handle_session_events(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let mut leave = false;
        loop {
            match session.events.try_recv() {
                Ok(event) => leave |= self.state.apply_event(event),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    leave = true;
                    break;
                }
            }
        }

        if leave {
            // Quay lại màn hình kết nối
            self.session = None;
            self.state.reset_session();
        }
    }

    fn send_command(&self, command: SessionCommand) {
        let Some(session) = &self.session else {
            return;
        };
        if let Err(err) = session.commands.try_send(command) {
            log::warn!("Failed to send command to session: {err}");
        }
    }

    fn show_connect(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(form) = connect_form::render(ui, &mut self.state) {
                self.begin_connect(form);
            }
        });
    }

    fn show_chat(&mut self, ctx: &egui::Context) {
        let mut disconnect = false;
        egui::SidePanel::left("peer_sidebar")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                disconnect = user_panel::render(ui, &self.state.client_info);
                peer_list::render(ui, &self.state.peer_cards);
            });

        let mut outgoing = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Chat");
            ui.separator();
            chat_area::render(
                ui,
                &self.state.messages,
                &mut self.state.scroll_to_bottom,
            );

            ui.separator();
            outgoing = input_bar::render(ui, &mut self.state.input_text);
        });

        if let Some(text) = outgoing {
            self.send_command(SessionCommand::SendMessage(text));
        }
        if disconnect {
            self.send_command(SessionCommand::Disconnect);
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_connect();
        self.handle_session_events();

        if self.session.is_some() {
            self.show_chat(ctx);
        } else {
            self.show_connect(ctx);
        }

        ctx.request_repaint();
    }
}
