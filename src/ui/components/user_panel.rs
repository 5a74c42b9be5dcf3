use eframe::egui;

use crate::common::ClientInfo;

/// Own nickname and address. Returns `true` when Disconnect was clicked.
pub fn render(ui: &mut egui::Ui, info: &ClientInfo) -> bool {
    ui.heading(info.nickname.as_deref().unwrap_or("…"));
    if let Some(address) = &info.client_address {
        ui.label(
            egui::RichText::new(format!(
                "{}:{}",
                address.ip.as_deref().unwrap_or("-"),
                address.port.as_deref().unwrap_or("-")
            ))
            .weak(),
        );
    }

    let disconnect = ui.button("Disconnect").clicked();
    ui.separator();
    disconnect
}
