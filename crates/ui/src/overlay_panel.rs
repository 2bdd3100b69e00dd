//! Modal detail overlay: a dimmed backdrop plus a centered card.
//!
//! Clicks on the backdrop close the overlay. The card sits on a higher
//! layer, so clicks inside it never reach the backdrop.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use interaction::{InteractionConfig, OverlayClick, OverlayCommand, OverlayController, OverlayView};

use crate::theme::ACCENT;

const CARD_WIDTH: f32 = 360.0;

/// Label/value rows shown under the title, in display order.
pub fn detail_rows(view: &OverlayView) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Type", view.kind_label().to_string()),
        ("Address", view.address().to_string()),
        ("Coordinates", view.coordinates().to_string()),
        ("Source", view.source_label().to_string()),
    ];
    match view {
        OverlayView::Empty { .. } => {}
        OverlayView::External {
            version,
            last_editor,
            ..
        } => {
            rows.push(("Version", version.to_string()));
            if let Some(editor) = last_editor {
                rows.push(("Last edited by", editor.clone()));
            }
        }
        OverlayView::UserSubmitted {
            severity,
            expires_at,
            ..
        } => {
            rows.push(("Severity", severity.label().to_string()));
            let expiry = expires_at.map_or_else(|| "Never".to_string(), |t| t.format("%Y-%m-%d %H:%M UTC").to_string());
            rows.push(("Expires", expiry));
        }
    }
    rows
}

fn icon(view: &OverlayView) -> &'static str {
    match view {
        OverlayView::Empty { .. } => "📍",
        OverlayView::External { summary, .. } | OverlayView::UserSubmitted { summary, .. } => summary.kind.icon(),
    }
}

pub fn overlay_panel_ui(
    mut contexts: EguiContexts,
    time: Res<Time>,
    config: Res<InteractionConfig>,
    overlay: Res<OverlayController>,
    mut commands: EventWriter<OverlayCommand>,
) {
    let Some(data) = overlay.data() else {
        return;
    };
    let view = OverlayView::derive(data);
    let progress = overlay.closing_progress(time.elapsed(), config.overlay.close_animation());
    let opacity = 1.0 - progress;
    let ctx = contexts.ctx_mut();
    let screen = ctx.screen_rect();

    egui::Area::new(egui::Id::new("overlay_backdrop"))
        .order(egui::Order::Middle)
        .fixed_pos(screen.min)
        .show(ctx, |ui| {
            let response = ui.allocate_response(screen.size(), egui::Sense::click());
            ui.painter()
                .rect_filled(screen, 0.0, egui::Color32::from_black_alpha((110.0 * opacity) as u8));
            if response.clicked() {
                commands.send(OverlayCommand::Click(OverlayClick::Outside));
            }
        });

    egui::Area::new(egui::Id::new("overlay_card"))
        .order(egui::Order::Foreground)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.set_opacity(opacity);
            egui::Frame::window(ui.style()).show(ui, |ui| {
                ui.set_width(CARD_WIDTH);
                ui.horizontal(|ui| {
                    ui.heading(format!("{} {}", icon(&view), view.title()));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("✕").clicked() {
                            commands.send(OverlayCommand::Close);
                        }
                    });
                });
                ui.separator();

                egui::Grid::new("overlay_details").num_columns(2).striped(true).show(ui, |ui| {
                    for (label, value) in detail_rows(&view) {
                        ui.label(egui::RichText::new(label).strong());
                        ui.label(value);
                        ui.end_row();
                    }
                });

                if let OverlayView::External { summary, .. } | OverlayView::UserSubmitted { summary, .. } = &view {
                    if !summary.tags.is_empty() {
                        ui.add_space(6.0);
                        ui.label(egui::RichText::new("Tags").strong());
                        for (key, value) in &summary.tags {
                            ui.label(format!("{key}: {value}"));
                        }
                        if summary.hidden_tags > 0 {
                            ui.weak(format!("+{} more", summary.hidden_tags));
                        }
                    }
                }

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    for action in view.actions() {
                        let button = egui::Button::new(egui::RichText::new(action.label()).color(egui::Color32::WHITE))
                            .fill(ACCENT);
                        if ui.add(button).clicked() {
                            commands.send(OverlayCommand::Action(action));
                        }
                    }
                });
            });
        });
}
