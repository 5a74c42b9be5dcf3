use eframe::egui;

use crate::common::ConnectForm;
use crate::ui::state::AppState;

/// Returns the form to submit when Connect is clicked.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) -> Option<ConnectForm> {
    ui.heading("Connect");
    ui.separator();

    egui::Grid::new("connect_form")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            ui.label("Nickname");
            ui.text_edit_singleline(&mut state.form.nickname);
            ui.end_row();

            ui.label("Secret key");
            ui.add(egui::TextEdit::singleline(&mut state.form.secret_key).password(true));
            ui.end_row();

            ui.label("Server IP");
            ui.text_edit_singleline(&mut state.form.ip_address);
            ui.end_row();

            ui.label("Port");
            ui.text_edit_singleline(&mut state.form.port);
            ui.end_row();
        });

    let label = if state.connect_pending {
        "Connecting..."
    } else {
        "Connect"
    };
    let clicked = ui
        .add_enabled(!state.connect_pending, egui::Button::new(label))
        .clicked();

    if let Some(error) = &state.connect_error {
        ui.colored_label(egui::Color32::RED, error);
    }

    clicked.then(|| state.form.clone())
}
