use eframe::egui;

use crate::common::PeerStatus;
use crate::view::PeerCard;

pub fn render(ui: &mut egui::Ui, cards: &[PeerCard]) {
    ui.heading("Peers");
    ui.separator();

    if cards.is_empty() {
        ui.label("No peers yet");
        return;
    }

    for card in cards {
        let color = match card.status {
            PeerStatus::Online => egui::Color32::GREEN,
            PeerStatus::Offline => egui::Color32::GRAY,
        };

        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.colored_label(color, "●");
                let chevron = if card.expanded { "▾" } else { "▸" };
                if ui.button(format!("{chevron} {}", card.nickname)).clicked() {
                    card.toggle.fire();
                }
            });

            if card.expanded {
                ui.label(format!("IP: {}", card.ip));
                ui.label(format!("Port: {}", card.port));
                ui.colored_label(color, &card.status_label);
            }
        });
    }
}
