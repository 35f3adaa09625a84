use egui::{Align2, Color32, Context, RichText};

use crate::model::Hud;

const ORDER_SIZE: f32 = 18.0;
const PROMPT_SIZE: f32 = 24.0;

/// Lay out the HUD overlay. Nothing here takes input.
pub fn draw_hud(ctx: &Context, hud: &Hud) {
    egui::Area::new(egui::Id::new("orders"))
        .anchor(Align2::LEFT_TOP, [12.0, 12.0])
        .interactable(false)
        .show(ctx, |ui| {
            for line in &hud.orders {
                let color = if line.urgent() { Color32::RED } else { Color32::WHITE };
                ui.label(RichText::new(line.text()).size(ORDER_SIZE).color(color).strong());
            }
        });

    egui::Area::new(egui::Id::new("score"))
        .anchor(Align2::RIGHT_TOP, [-12.0, 12.0])
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(RichText::new(hud.score_text()).size(PROMPT_SIZE).color(Color32::WHITE).strong());
        });

    if let Some(prompt) = hud.prompt {
        egui::Area::new(egui::Id::new("prompt"))
            .anchor(Align2::CENTER_BOTTOM, [0.0, -24.0])
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(RichText::new(prompt.text()).size(PROMPT_SIZE).color(Color32::WHITE));
            });
    }
}
