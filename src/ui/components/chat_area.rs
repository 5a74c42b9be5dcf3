use eframe::egui;

use crate::view::MessageEntry;

pub fn render(ui: &mut egui::Ui, messages: &[MessageEntry], scroll_to_bottom: &mut bool) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .max_height((ui.available_height() - 40.0).max(0.0))
        .show(ui, |ui| {
            for message in messages {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&message.username).strong());
                    ui.label(egui::RichText::new(&message.time_only).weak())
                        .on_hover_text(&message.full_timestamp);
                });
                ui.label(&message.content);
                ui.add_space(4.0);
            }

            if *scroll_to_bottom {
                ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                *scroll_to_bottom = false;
            }
        });
}
