//! Raw Bevy input → `PointerInput` for the arbiter.
//!
//! Nothing reaches the map while egui is handling the pointer or the overlay
//! is open. A gesture that started on the map and ends over a panel is
//! cancelled rather than released.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::input::touch::TouchPhase;
use bevy::prelude::*;
use bevy::window::{CursorLeft, CursorMoved, PrimaryWindow};
use bevy_egui::EguiContexts;
use interaction::{MapFlight, MapView, OverlayController, PointerInput, PointerPhase, PointerSource};

/// Zoom levels per wheel notch.
pub const ZOOM_PER_LINE: f64 = 0.5;
/// Pixels of trackpad scroll per zoom level.
pub const PIXELS_PER_ZOOM: f64 = 240.0;

/// True while the cursor is over an egui panel or egui owns a drag.
#[inline]
pub fn egui_wants_pointer(contexts: &mut EguiContexts) -> bool {
    let ctx = contexts.ctx_mut();
    ctx.wants_pointer_input() || ctx.is_pointer_over_area()
}

pub fn touch_phase(phase: TouchPhase) -> PointerPhase {
    match phase {
        TouchPhase::Started => PointerPhase::Down,
        TouchPhase::Moved => PointerPhase::Move,
        TouchPhase::Ended => PointerPhase::Up,
        TouchPhase::Canceled => PointerPhase::Cancel,
    }
}

/// What to forward for `phase` when the map may not see the pointer.
/// Presses are dropped; anything that could finish a gesture becomes a
/// cancel.
pub fn blocked_phase(phase: PointerPhase) -> Option<PointerPhase> {
    match phase {
        PointerPhase::Down | PointerPhase::Move => None,
        PointerPhase::Up | PointerPhase::Leave | PointerPhase::Cancel => Some(PointerPhase::Cancel),
    }
}

pub fn wheel_zoom_delta(unit: MouseScrollUnit, y: f32) -> f64 {
    match unit {
        MouseScrollUnit::Line => y as f64 * ZOOM_PER_LINE,
        MouseScrollUnit::Pixel => y as f64 / PIXELS_PER_ZOOM,
    }
}

pub fn sync_viewport(windows: Query<&Window, With<PrimaryWindow>>, mut view: ResMut<MapView>) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let size = window.size();
    if size.x > 0.0 && size.y > 0.0 && view.viewport != size {
        view.viewport = size;
    }
}

#[allow(clippy::too_many_arguments)]
pub fn forward_pointer_input(
    mouse: Res<ButtonInput<MouseButton>>,
    mut cursor_moved: EventReader<CursorMoved>,
    mut cursor_left: EventReader<CursorLeft>,
    mut touches: EventReader<TouchInput>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut contexts: EguiContexts,
    overlay: Res<OverlayController>,
    view: Res<MapView>,
    mut last_cursor: Local<Option<Vec2>>,
    mut out: EventWriter<PointerInput>,
) {
    let blocked = overlay.is_visible() || egui_wants_pointer(&mut contexts);
    let mut send = |phase: PointerPhase, source: PointerSource, screen: Vec2| {
        let phase = if blocked {
            match blocked_phase(phase) {
                Some(p) => p,
                None => return,
            }
        } else {
            phase
        };
        out.send(PointerInput::new(phase, source, screen, view.screen_to_geo(screen)));
    };

    for moved in cursor_moved.read() {
        if *last_cursor == Some(moved.position) {
            continue;
        }
        *last_cursor = Some(moved.position);
        send(PointerPhase::Move, PointerSource::Mouse, moved.position);
    }

    let cursor = windows
        .get_single()
        .ok()
        .and_then(Window::cursor_position)
        .or(*last_cursor);
    if let Some(at) = cursor {
        if mouse.just_pressed(MouseButton::Left) {
            send(PointerPhase::Down, PointerSource::Mouse, at);
        }
        if mouse.just_released(MouseButton::Left) {
            send(PointerPhase::Up, PointerSource::Mouse, at);
        }
    }
    if cursor_left.read().last().is_some() {
        *last_cursor = None;
        send(PointerPhase::Leave, PointerSource::Mouse, cursor.unwrap_or_default());
    }

    for touch in touches.read() {
        send(touch_phase(touch.phase), PointerSource::Touch(touch.id), touch.position);
    }
}

pub fn zoom_with_wheel(
    mut wheel: EventReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut contexts: EguiContexts,
    mut view: ResMut<MapView>,
    mut flight: ResMut<MapFlight>,
) {
    if egui_wants_pointer(&mut contexts) {
        wheel.clear();
        return;
    }
    let anchor = windows
        .get_single()
        .ok()
        .and_then(Window::cursor_position)
        .unwrap_or(view.viewport / 2.0);
    for event in wheel.read() {
        let delta = wheel_zoom_delta(event.unit, event.y);
        if delta != 0.0 {
            flight.cancel();
            view.zoom_around(anchor, delta);
        }
    }
}
