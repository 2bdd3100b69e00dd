//! Background painter for the map surface: graticule, markers, readout.
//!
//! Tiles are not rendered; the graticule gives panning and zooming a
//! visible reference.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use geodata::Coordinates;
use interaction::map_view::{project, wrap_lng};
use interaction::{MapView, OverlayController, SearchController};

use crate::theme::{ACCENT, GRID_LINE, LAND};

/// Graticule steps in degrees, coarse to fine.
const GRID_STEPS: [f64; 12] = [30.0, 10.0, 5.0, 2.0, 1.0, 0.5, 0.2, 0.1, 0.05, 0.02, 0.01, 0.005];
/// Minimum on-screen gap between graticule lines.
const MIN_GRID_GAP_PX: f64 = 90.0;

/// The finest graticule step that keeps lines at least `MIN_GRID_GAP_PX`
/// apart at `zoom`.
pub fn grid_step_deg(zoom: f64) -> f64 {
    // Pixels per degree of longitude.
    let px_per_deg = project(Coordinates::new(0.0, 1.0), zoom).x - project(Coordinates::new(0.0, 0.0), zoom).x;
    GRID_STEPS
        .iter()
        .copied()
        .rev()
        .find(|step| step * px_per_deg >= MIN_GRID_GAP_PX)
        .unwrap_or(GRID_STEPS[0])
}

/// Multiples of `step` covering `[from, to]`.
pub fn grid_values(from: f64, to: f64, step: f64) -> Vec<f64> {
    let first = (from / step).ceil() as i64;
    let last = (to / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

/// Meridians on screen as (screen x, label longitude). Works on unwrapped
/// longitudes, so a view spanning the antimeridian or several world copies
/// still gets every line.
pub fn visible_meridians(view: &MapView, step: f64) -> Vec<(f32, f64)> {
    let west = view.unwrapped_lng_at(0.0);
    let east = view.unwrapped_lng_at(view.viewport.x);
    grid_values(west, east, step)
        .into_iter()
        .map(|lng| (view.screen_x_of_lng(lng), wrap_lng(lng)))
        .collect()
}

fn to_pos(p: Vec2) -> egui::Pos2 {
    egui::pos2(p.x, p.y)
}

pub fn paint_map_canvas(
    mut contexts: EguiContexts,
    view: Res<MapView>,
    search: Res<SearchController>,
    overlay: Res<OverlayController>,
) {
    let ctx = contexts.ctx_mut();
    let screen = ctx.screen_rect();
    let painter = ctx.layer_painter(egui::LayerId::background());
    painter.rect_filled(screen, 0.0, LAND);

    // Graticule
    let top_left = view.screen_to_geo(Vec2::ZERO);
    let bottom_right = view.screen_to_geo(view.viewport);
    let step = grid_step_deg(view.zoom);
    let stroke = egui::Stroke::new(1.0, GRID_LINE);
    let label_color = GRID_LINE.gamma_multiply(1.6);
    for (x, lng) in visible_meridians(&view, step) {
        painter.vline(x, screen.y_range(), stroke);
        painter.text(
            egui::pos2(x + 3.0, screen.bottom() - 34.0),
            egui::Align2::LEFT_BOTTOM,
            format!("{lng:.3}°"),
            egui::FontId::proportional(10.0),
            label_color,
        );
    }
    for lat in grid_values(bottom_right.lat, top_left.lat, step) {
        let y = view.geo_to_screen(Coordinates::new(lat, view.center.lng)).y;
        painter.hline(screen.x_range(), y, stroke);
        painter.text(
            egui::pos2(screen.left() + 3.0, y - 2.0),
            egui::Align2::LEFT_BOTTOM,
            format!("{lat:.3}°"),
            egui::FontId::proportional(10.0),
            label_color,
        );
    }

    // Search results, numbered like the dropdown.
    for (i, place) in search.results.iter().enumerate() {
        let at = to_pos(view.geo_to_screen(place.coordinates));
        painter.circle(at, 11.0, ACCENT, egui::Stroke::new(2.0, egui::Color32::WHITE));
        painter.text(
            at,
            egui::Align2::CENTER_CENTER,
            (i + 1).to_string(),
            egui::FontId::proportional(11.0),
            egui::Color32::WHITE,
        );
    }

    if let Some(data) = overlay.data() {
        let at = to_pos(view.geo_to_screen(data.coordinates));
        painter.circle_stroke(at, 14.0, egui::Stroke::new(3.0, egui::Color32::from_rgb(220, 38, 38)));
        painter.circle_filled(at, 4.0, egui::Color32::from_rgb(220, 38, 38));
    }

    painter.text(
        screen.right_bottom() - egui::vec2(6.0, 6.0),
        egui::Align2::RIGHT_BOTTOM,
        format!(
            "{}  z{:.1}  ·  © OpenStreetMap contributors",
            view.center.format_fixed(),
            view.zoom
        ),
        egui::FontId::proportional(11.0),
        egui::Color32::from_gray(90),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_gets_finer_when_zooming_in() {
        let coarse = grid_step_deg(3.0);
        let fine = grid_step_deg(14.0);
        assert!(fine < coarse, "{fine} should be finer than {coarse}");
        assert_eq!(grid_step_deg(0.0), 30.0);
        assert_eq!(grid_step_deg(22.0), 0.005);
    }

    #[test]
    fn test_grid_values_cover_range() {
        assert_eq!(grid_values(-0.25, 0.35, 0.1).len(), 6);
        assert_eq!(grid_values(1.0, 3.0, 1.0), vec![1.0, 2.0, 3.0]);
        assert!(grid_values(0.2, 0.3, 1.0).is_empty());
    }

    #[test]
    fn test_meridians_survive_the_antimeridian() {
        let mut view = MapView::default();
        view.center = Coordinates::new(0.0, 179.0);
        view.zoom = 6.0;
        let step = grid_step_deg(view.zoom);
        let lines = visible_meridians(&view, step);
        assert!(!lines.is_empty());
        assert!(lines.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(lines.iter().any(|&(_, lng)| lng < 0.0));
        assert!(lines.iter().all(|&(x, _)| (0.0..=view.viewport.x).contains(&x)));
    }

    #[test]
    fn test_meridians_at_world_zoom() {
        let mut view = MapView::default();
        view.zoom = view.min_zoom;
        let lines = visible_meridians(&view, grid_step_deg(view.zoom));
        assert!(lines.len() > 360 / 30);
    }
}
