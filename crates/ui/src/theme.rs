use bevy_egui::{egui, EguiContexts};

/// Accent used for markers and the selected-result highlight.
pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(37, 99, 235);
/// Background behind the graticule.
pub const LAND: egui::Color32 = egui::Color32::from_rgb(236, 239, 232);
pub const GRID_LINE: egui::Color32 = egui::Color32::from_rgb(200, 206, 196);

pub fn apply_map_theme(mut contexts: EguiContexts) {
    let ctx = contexts.ctx_mut();
    let mut style = (*ctx.style()).clone();
    style.visuals = egui::Visuals::light();

    let panel = egui::Color32::from_rgb(250, 250, 252);
    let inactive = egui::Color32::from_rgb(241, 243, 247);
    let hover = egui::Color32::from_rgb(226, 232, 240);

    style.visuals.window_fill = panel;
    style.visuals.panel_fill = panel;
    style.visuals.widgets.inactive.bg_fill = inactive;
    style.visuals.widgets.inactive.weak_bg_fill = inactive;
    style.visuals.widgets.hovered.bg_fill = hover;
    style.visuals.widgets.hovered.weak_bg_fill = hover;
    style.visuals.widgets.active.bg_fill = ACCENT;
    style.visuals.widgets.active.weak_bg_fill = ACCENT;
    style.visuals.selection.bg_fill = ACCENT.gamma_multiply(0.3);
    style.visuals.selection.stroke = egui::Stroke::new(1.0, ACCENT);

    // egui 0.31 corner radii are u8
    style.visuals.window_corner_radius = egui::CornerRadius::same(12);
    style.visuals.widgets.inactive.corner_radius = egui::CornerRadius::same(8);
    style.visuals.widgets.hovered.corner_radius = egui::CornerRadius::same(8);
    style.visuals.widgets.active.corner_radius = egui::CornerRadius::same(8);

    ctx.set_style(style);
}
