use eframe::egui;

/// Returns the text to submit when Send is clicked or Enter is pressed.
///
/// The field is not cleared here; it is cleared once the server accepts the
/// message.
pub fn render(ui: &mut egui::Ui, input_text: &mut String) -> Option<String> {
    let mut send = false;
    ui.horizontal(|ui| {
        let response = ui.text_edit_singleline(input_text);
        if ui.button("Send").clicked() {
            send = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
            response.request_focus();
        }
    });

    send.then(|| input_text.clone())
}
