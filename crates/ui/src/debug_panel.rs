//! Service activity viewer, toggled with F12.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use interaction::{ActivityEntry, ActivityKind, ActivityLog, PendingLookups, PendingSearches, SearchController};

#[derive(Resource, Default)]
pub struct DebugPanelVisible(pub bool);

pub fn format_entry(entry: &ActivityEntry) -> String {
    let kind = match entry.kind {
        ActivityKind::Request => "→",
        ActivityKind::Response => "←",
        ActivityKind::Failure => "✗",
    };
    let mut line = format!(
        "[{:>8.2}s] {} {} {}",
        entry.at.as_secs_f64(),
        entry.service,
        kind,
        entry.message
    );
    if let Some(took) = entry.duration {
        line.push_str(&format!(" ({} ms)", took.as_millis()));
    }
    line
}

pub fn toggle_debug_panel(keyboard: Res<ButtonInput<KeyCode>>, mut visible: ResMut<DebugPanelVisible>) {
    if keyboard.just_pressed(KeyCode::F12) {
        visible.0 = !visible.0;
    }
}

pub fn debug_panel_ui(
    mut contexts: EguiContexts,
    mut visible: ResMut<DebugPanelVisible>,
    mut activity: ResMut<ActivityLog>,
    search: Res<SearchController>,
    lookups: Res<PendingLookups>,
    searches: Res<PendingSearches>,
) {
    if !visible.0 {
        return;
    }
    let mut open = visible.0;
    egui::Window::new("Service Activity")
        .open(&mut open)
        .default_width(480.0)
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(8.0, -28.0))
        .show(contexts.ctx_mut(), |ui| {
            ui.horizontal(|ui| {
                ui.label(format!(
                    "{} entries · {} lookups · {} searches in flight",
                    activity.len(),
                    lookups.len(),
                    searches.len()
                ));
                if ui.small_button("Clear").clicked() {
                    activity.clear();
                }
            });
            if let Some(error) = &search.last_error {
                ui.colored_label(egui::Color32::from_rgb(185, 28, 28), format!("Last search error: {error}"));
            }
            ui.separator();
            egui::ScrollArea::vertical().max_height(280.0).show(ui, |ui| {
                for entry in activity.entries() {
                    let text = egui::RichText::new(format_entry(entry)).monospace();
                    if entry.kind == ActivityKind::Failure {
                        ui.colored_label(egui::Color32::from_rgb(185, 28, 28), text);
                    } else {
                        ui.label(text);
                    }
                }
            });
        });
    visible.0 = open;
}
