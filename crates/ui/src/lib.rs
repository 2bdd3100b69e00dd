use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use interaction::InteractionSet;

pub mod debug_panel;
pub mod map_canvas;
pub mod overlay_panel;
pub mod pointer_bridge;
pub mod search_bar;
pub mod session_badge;
pub mod theme;

/// Egui presentation on top of `InteractionPlugin`: input goes in before
/// the interaction phases, everything is painted after them.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .init_resource::<debug_panel::DebugPanelVisible>()
            .init_resource::<search_bar::SearchBarRects>()
            .add_systems(Startup, theme::apply_map_theme)
            .add_systems(
                Update,
                (
                    pointer_bridge::sync_viewport,
                    pointer_bridge::forward_pointer_input,
                    pointer_bridge::zoom_with_wheel,
                    debug_panel::toggle_debug_panel,
                )
                    .chain()
                    .before(InteractionSet::Input),
            )
            .add_systems(
                Update,
                (
                    map_canvas::paint_map_canvas,
                    search_bar::search_bar_ui,
                    search_bar::close_dropdown_on_outside_click,
                    session_badge::session_badge_ui,
                    overlay_panel::overlay_panel_ui,
                    debug_panel::debug_panel_ui,
                )
                    .chain()
                    .after(InteractionSet::Apply),
            );
    }
}
